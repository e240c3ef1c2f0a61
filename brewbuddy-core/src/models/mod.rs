//! Data model for the brew journal.

mod brew;
mod profile;

pub use brew::{BrewEntry, ValidationError, RATING_MAX, RATING_MIN};
pub use profile::UserProfile;
