//! Academic data ports.

use async_trait::async_trait;

use crate::academic::model::{AcademicYear, Campus, NewAcademicYear};
use crate::error::Result;

/// Read access to the academic lists the context is resolved from.
#[async_trait]
pub trait AcademicApi: Send + Sync {
    /// Every academic year, in server order.
    async fn list_years(&self) -> Result<Vec<AcademicYear>>;

    /// The global campus list. Only meaningful for the top-level role.
    async fn list_campuses(&self) -> Result<Vec<Campus>>;
}

/// Structural changes to academic years.
#[async_trait]
pub trait AcademicAdminApi: Send + Sync {
    async fn create_year(&self, year: &NewAcademicYear) -> Result<()>;

    /// Flags `year_id` as the current year (the server clears the others).
    async fn set_current_year(&self, year_id: &str) -> Result<()>;
}
