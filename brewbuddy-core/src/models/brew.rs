use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Lowest rating a brew can carry.
pub const RATING_MIN: f64 = 0.0;
/// Highest rating a brew can carry.
pub const RATING_MAX: f64 = 5.0;

/// Errors raised when a brew is checked before being persisted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("brew name cannot be empty")]
    EmptyName,

    #[error("rating {0} is outside the range 0.0 to 5.0")]
    RatingOutOfRange(f64),
}

/// A single journal entry for one brewed coffee.
///
/// `key` is the store-assigned document key. It is absent for a draft that
/// has never been persisted, assigned by the store on first creation, and
/// never written inside the stored value itself - which is why it is skipped
/// during (de)serialization and stamped from the snapshot key instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewEntry {
    #[serde(skip)]
    pub key: Option<String>,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub rating: f64,
}

impl Default for BrewEntry {
    /// A blank draft, as presented by the add-entry flow.
    fn default() -> Self {
        Self {
            key: None,
            name: String::new(),
            notes: String::new(),
            rating: 0.0,
        }
    }
}

impl BrewEntry {
    /// Create a draft that has not been persisted yet.
    pub fn draft(name: impl Into<String>, notes: impl Into<String>, rating: f64) -> Self {
        Self {
            key: None,
            name: name.into(),
            notes: notes.into(),
            rating,
        }
    }

    /// Decode one child of a collection snapshot, stamping the store key.
    pub fn from_snapshot(key: &str, value: Value) -> Result<Self, serde_json::Error> {
        let mut entry: BrewEntry = serde_json::from_value(value)?;
        entry.key = Some(key.to_string());
        Ok(entry)
    }

    /// Check the entry at edit-commit time.
    ///
    /// The name must be non-empty after trimming and the rating must sit in
    /// `[RATING_MIN, RATING_MAX]`. A NaN rating fails the range check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !(RATING_MIN..=RATING_MAX).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }

    /// True once the store has assigned this entry a key.
    pub fn is_persisted(&self) -> bool {
        self.key.is_some()
    }
}

impl fmt::Display for BrewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;
        writeln!(f, "Rating: {:.1} / {:.1}", self.rating, RATING_MAX)?;
        if !self.notes.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.notes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_entry_passes() {
        let entry = BrewEntry::draft("Ethiopia", "fruity", 4.5);
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_boundary_ratings_pass() {
        assert!(BrewEntry::draft("Kenya", "", 0.0).validate().is_ok());
        assert!(BrewEntry::draft("Kenya", "", 5.0).validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let entry = BrewEntry::draft("", "x", 3.0);
        assert_eq!(entry.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let entry = BrewEntry::draft("   ", "x", 3.0);
        assert_eq!(entry.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let entry = BrewEntry::draft("Kenya", "bold", 6.0);
        assert_eq!(
            entry.validate(),
            Err(ValidationError::RatingOutOfRange(6.0))
        );
        let entry = BrewEntry::draft("Kenya", "bold", -0.1);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_nan_rating_rejected() {
        let entry = BrewEntry::draft("Kenya", "bold", f64::NAN);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_from_snapshot_stamps_key() {
        let value = json!({"name": "Ethiopia", "notes": "fruity", "rating": 4.5});
        let entry = BrewEntry::from_snapshot("k1", value).unwrap();
        assert_eq!(entry.key.as_deref(), Some("k1"));
        assert_eq!(entry.name, "Ethiopia");
        assert_eq!(entry.notes, "fruity");
        assert_eq!(entry.rating, 4.5);
    }

    #[test]
    fn test_from_snapshot_missing_name_fails() {
        let value = json!({"notes": "no name here", "rating": 2.0});
        assert!(BrewEntry::from_snapshot("k1", value).is_err());
    }

    #[test]
    fn test_serialized_value_excludes_key() {
        let mut entry = BrewEntry::draft("Ethiopia", "fruity", 4.5);
        entry.key = Some("k1".to_string());
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("key").is_none());
        assert_eq!(value.get("name").unwrap(), "Ethiopia");
    }
}
