//! Docent core crate - shared data model, wire types, configuration, errors.

pub mod config;
pub mod error;
pub mod types;

pub use config::DocentConfig;
pub use error::{DocentError, Result};
