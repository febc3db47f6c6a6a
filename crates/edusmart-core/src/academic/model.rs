//! Academic context domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A campus (branch) of the institution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Campus {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
}

impl Campus {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An academic year (session) such as "2025-26".
///
/// Server-owned; the client only selects among fetched years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicYear {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display label, sent by the backend as `year`
    #[serde(rename = "year", alias = "label")]
    pub label: String,
    #[serde(default, with = "wire_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "wire_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
}

impl AcademicYear {
    pub fn new(id: impl Into<String>, label: impl Into<String>, is_current: bool) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            start_date: None,
            end_date: None,
            is_current,
        }
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Whether `date` falls inside the year (inclusive). Unknown bounds are open.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| start <= date)
            && self.end_date.is_none_or(|end| date <= end)
    }
}

/// Payload for creating a new academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAcademicYear {
    #[serde(rename = "year")]
    pub label: String,
    #[serde(with = "wire_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "wire_date")]
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
}

/// The campus/year pair every scoped read is filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextScope {
    pub campus_id: String,
    pub year_id: String,
}

impl ContextScope {
    /// Query parameters appended to scoped reads.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("academicYearId", self.year_id.clone()),
            ("campusId", self.campus_id.clone()),
        ]
    }
}

/// Client-side academic context: what is available and what is active.
///
/// `active_campus` is always an element of `available_campuses` (or `None`),
/// and the same holds for years. Only the resolver constructs non-empty
/// contexts, through [`AcademicContext::resolved`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcademicContext {
    active_campus: Option<Campus>,
    active_year: Option<AcademicYear>,
    available_campuses: Vec<Campus>,
    available_years: Vec<AcademicYear>,
}

impl AcademicContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a context from fetched lists and the selected ids.
    ///
    /// Ids that are not in the corresponding list resolve to `None`.
    pub fn resolved(
        campuses: Vec<Campus>,
        years: Vec<AcademicYear>,
        campus_id: Option<&str>,
        year_id: Option<&str>,
    ) -> Self {
        let active_campus = campus_id.and_then(|id| campuses.iter().find(|c| c.id == id).cloned());
        let active_year = year_id.and_then(|id| years.iter().find(|y| y.id == id).cloned());
        Self {
            active_campus,
            active_year,
            available_campuses: campuses,
            available_years: years,
        }
    }

    pub fn active_campus(&self) -> Option<&Campus> {
        self.active_campus.as_ref()
    }

    pub fn active_year(&self) -> Option<&AcademicYear> {
        self.active_year.as_ref()
    }

    pub fn available_campuses(&self) -> &[Campus] {
        &self.available_campuses
    }

    pub fn available_years(&self) -> &[AcademicYear] {
        &self.available_years
    }

    pub fn campus(&self, id: &str) -> Option<&Campus> {
        self.available_campuses.iter().find(|c| c.id == id)
    }

    pub fn year(&self, id: &str) -> Option<&AcademicYear> {
        self.available_years.iter().find(|y| y.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.available_campuses.is_empty() && self.available_years.is_empty()
    }

    /// The active scope, present only when both campus and year are active.
    pub fn scope(&self) -> Option<ContextScope> {
        match (&self.active_campus, &self.active_year) {
            (Some(campus), Some(year)) => Some(ContextScope {
                campus_id: campus.id.clone(),
                year_id: year.id.clone(),
            }),
            _ => None,
        }
    }

    /// Activates an available campus. Returns false if `id` is not available.
    pub fn select_campus(&mut self, id: &str) -> bool {
        match self.campus(id).cloned() {
            Some(campus) => {
                self.active_campus = Some(campus);
                true
            }
            None => false,
        }
    }

    /// Activates an available year. Returns false if `id` is not available.
    pub fn select_year(&mut self, id: &str) -> bool {
        match self.year(id).cloned() {
            Some(year) => {
                self.active_year = Some(year);
                true
            }
            None => false,
        }
    }
}

/// Dates arrive either as `YYYY-MM-DD` or as full ISO timestamps
/// (`2025-04-01T00:00:00.000Z`); only the date part is kept.
mod wire_date {
    use super::*;

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => {
                let date_part = text.get(..10).unwrap_or(text);
                NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}
