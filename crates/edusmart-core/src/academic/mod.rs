//! Academic context domain module.
//!
//! # Module Structure
//!
//! - `model`: Campus, AcademicYear and the derived AcademicContext
//! - `selection`: precedence rules for the active campus and year
//! - `repository`: backend ports for academic lists and year administration

mod model;
mod repository;
pub mod selection;

pub use model::{AcademicContext, AcademicYear, Campus, ContextScope, NewAcademicYear};
pub use repository::{AcademicAdminApi, AcademicApi};
