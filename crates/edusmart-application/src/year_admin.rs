//! Academic year administration for the top-level role.

use crate::academic_context::AcademicContextResolver;
use crate::notification::Notifier;
use edusmart_core::academic::{AcademicAdminApi, NewAcademicYear};
use edusmart_core::error::{EduError, Result};
use std::sync::Arc;

pub struct AcademicYearAdmin {
    api: Arc<dyn AcademicAdminApi>,
    resolver: Arc<AcademicContextResolver>,
    notifier: Notifier,
}

impl AcademicYearAdmin {
    pub fn new(
        api: Arc<dyn AcademicAdminApi>,
        resolver: Arc<AcademicContextResolver>,
        notifier: Notifier,
    ) -> Self {
        Self {
            api,
            resolver,
            notifier,
        }
    }

    /// Creates a year, then refreshes the context so it becomes selectable.
    pub async fn create_year(&self, year: &NewAcademicYear) -> Result<()> {
        if year.label.trim().is_empty() {
            return Err(EduError::invalid_selection("AcademicYear", &year.label));
        }
        if let (Some(start), Some(end)) = (year.start_date, year.end_date) {
            if start > end {
                return Err(EduError::invalid_selection(
                    "AcademicYear",
                    format!("{} ({} after {})", year.label, start, end),
                ));
            }
        }

        if let Err(e) = self.api.create_year(year).await {
            tracing::error!("[YearAdmin] Failed to create {}: {}", year.label, e);
            self.notifier.error(match &e {
                EduError::Http { message, .. } if !message.is_empty() => message.clone(),
                _ => "Failed to create year".to_string(),
            });
            return Err(e);
        }

        tracing::info!("[YearAdmin] Created academic year {}", year.label);
        self.notifier.success("New academic year created");
        self.resolver.refresh().await
    }

    /// Flags `year_id` as the institution's current year.
    ///
    /// Does NOT change the user's active year; the refresh only updates the
    /// `is_current` flags of the listed years.
    pub async fn set_current_year(&self, year_id: &str) -> Result<()> {
        if self.resolver.snapshot().context.year(year_id).is_none() {
            return Err(EduError::invalid_selection("AcademicYear", year_id));
        }

        if let Err(e) = self.api.set_current_year(year_id).await {
            tracing::error!("[YearAdmin] Failed to set current year {}: {}", year_id, e);
            self.notifier.error("Failed to update active session");
            return Err(e);
        }

        tracing::info!("[YearAdmin] Current year set to {}", year_id);
        self.notifier.success("Active session updated");
        self.resolver.refresh().await
    }
}
