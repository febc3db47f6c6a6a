//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session, Role, Credentials and SessionPhase
//! - `repository`: credential persistence and authentication ports

mod model;
mod repository;

pub use model::{Credentials, Role, Session, SessionPhase};
pub use repository::{AuthApi, CredentialRepository};
