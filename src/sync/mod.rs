//! External catalog collaborators

pub mod facebook;

pub use facebook::{FacebookSync, SyncReport};
