//! External data collaborators

pub mod fx;
