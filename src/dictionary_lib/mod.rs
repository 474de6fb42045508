//! Dictionary management for the Meetei Mayek normalizer.
//!
//! This module owns everything the substitution engine needs to know about
//! mappings:
//!
//! - [`Dictionary`]: a validated, immutable pattern → replacement mapping,
//!   parsed from the flat JSON object format used for custom dictionaries.
//! - [`DictionaryStore`]: the active dictionary (built-in default, optionally
//!   overlaid with user overrides) with atomic merge/reset.
//! - [`CustomDictionaryFile`]: on-disk persistence of the user override mapping.
//!
//! Users generally interact with this through [`crate::MayekConverter`], but the
//! types are public for callers that manage dictionaries themselves.

use std::path::PathBuf;

use thiserror::Error;

mod dictionary;
mod persist;
mod store;

pub use dictionary::Dictionary;
pub use persist::{CustomDictionaryFile, DICT_PATH_ENV};
pub use store::DictionaryStore;

/// Errors raised while building, loading or saving a [`Dictionary`].
///
/// A failed merge never changes the active dictionary, so every variant is
/// recoverable by the caller.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The input was valid JSON but not a flat object of string → string
    /// entries with non-empty keys.
    #[error("Invalid dictionary format: {0}")]
    InvalidFormat(String),
    /// The input was not JSON at all.
    #[error("Error parsing dictionary file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Error accessing dictionary file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DictionaryError {
    /// `true` for the shape errors a user can fix by editing their dictionary.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, DictionaryError::InvalidFormat(_))
    }
}
