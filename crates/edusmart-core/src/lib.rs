//! Domain layer of the EduSmart client.
//!
//! Models, ports and pure rules shared by every other crate. Nothing here
//! performs I/O; adapters live in `edusmart-infrastructure` and
//! `edusmart-interaction`.

pub mod academic;
pub mod access;
pub mod config;
pub mod error;
pub mod preference;
pub mod resource;
pub mod session;

// Re-export common error type
pub use error::{EduError, Result};
