//! Stored preference keys.

use std::fmt;

/// A user's last explicit campus/year choice.
///
/// Each key is namespaced by user id, so two accounts signing in on the same
/// installation keep separate choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    PreferredCampus,
    PreferredYear,
}

impl PreferenceKey {
    pub fn name(&self) -> &'static str {
        match self {
            PreferenceKey::PreferredCampus => "preferredCampusId",
            PreferenceKey::PreferredYear => "preferredYearId",
        }
    }

    /// Storage key for `user_id`, e.g. `preferredYearId:u1`.
    pub fn for_user(&self, user_id: &str) -> String {
        format!("{}:{}", self.name(), user_id)
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
