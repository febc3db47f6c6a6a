//! Selection precedence for the active campus and year.
//!
//! List order is whatever the server returned; "first" means first in that
//! order, it is never re-sorted here.

use super::model::{AcademicYear, Campus};

/// Picks the year to activate.
///
/// Precedence: the currently active year (kept across a refresh), the stored
/// preference, the year flagged `is_current`, then the first year.
pub fn select_year<'a>(
    years: &'a [AcademicYear],
    retained: Option<&str>,
    preferred: Option<&str>,
) -> Option<&'a AcademicYear> {
    find_by_id(years, retained, |y| &y.id)
        .or_else(|| find_by_id(years, preferred, |y| &y.id))
        .or_else(|| years.iter().find(|y| y.is_current))
        .or_else(|| years.first())
}

/// Picks the campus to activate.
///
/// Precedence: the currently active campus (kept across a refresh), the
/// stored preference, then the first campus.
pub fn select_campus<'a>(
    campuses: &'a [Campus],
    retained: Option<&str>,
    preferred: Option<&str>,
) -> Option<&'a Campus> {
    find_by_id(campuses, retained, |c| &c.id)
        .or_else(|| find_by_id(campuses, preferred, |c| &c.id))
        .or_else(|| campuses.first())
}

fn find_by_id<'a, T>(
    items: &'a [T],
    id: Option<&str>,
    id_of: impl Fn(&T) -> &String,
) -> Option<&'a T> {
    let id = id?;
    items.iter().find(|item| id_of(item).as_str() == id)
}
