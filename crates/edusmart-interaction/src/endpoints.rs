//! Backend routes, relative to the configured API base URL.

pub const AUTH_LOGIN: &str = "/auth/login";

pub const ACADEMIC_YEARS: &str = "/academics/years";

/// Global campus list (top-level role only).
pub const CAMPUSES: &str = "/campuses";

pub const CREATE_ACADEMIC_YEAR: &str = "/campuses/academic-year";

/// The id is percent-encoded as a single path segment.
pub fn set_current_year(year_id: &str) -> String {
    format!(
        "/campuses/academic-years/set-current/{}",
        urlencoding::encode(year_id)
    )
}
