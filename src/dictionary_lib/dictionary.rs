//! Typed substitution dictionary.
//!
//! A [`Dictionary`] maps a non-canonical grapheme sequence (the *pattern*) to
//! its canonical spelling (the *replacement*). Patterns are never empty; the
//! parse step rejects them instead of leaving the engine to deal with an
//! empty match.
//!
//! ## Example
//! ```
//! use mayek_normalize::dictionary_lib::Dictionary;
//!
//! let dict = Dictionary::from_json_str(r#"{ "ꯁꯣꯪ": "ꯁꯣꯡ" }"#).unwrap();
//! assert_eq!(dict.get("ꯁꯣꯪ"), Some("ꯁꯣꯡ"));
//!
//! assert!(Dictionary::from_json_str("[1, 2]").is_err());
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::DictionaryError;
use crate::substitution::{ConversionError, SubstitutionPlan};

/// Built-in default mapping, embedded at compile time.
const DEFAULT_DICTIONARY_JSON: &str = include_str!("../dicts/default_dictionary.json");

static BUILTIN: OnceCell<Arc<Dictionary>> = OnceCell::new();

/// An immutable pattern → replacement mapping.
///
/// The compiled pass list used by the substitution engine is built lazily the
/// first time the dictionary is used for a conversion and then reused, so a
/// dictionary published by the store is compiled at most once.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    map: FxHashMap<String, String>,
    plan: OnceCell<SubstitutionPlan>,
}

impl Dictionary {
    /// Returns the built-in default dictionary.
    ///
    /// The embedded JSON is parsed once per process; later calls share the
    /// same `Arc`.
    pub fn builtin() -> Result<Arc<Self>, DictionaryError> {
        BUILTIN
            .get_or_try_init(|| Self::from_json_str(DEFAULT_DICTIONARY_JSON).map(Arc::new))
            .map(Arc::clone)
    }

    /// Builds a dictionary from `(pattern, replacement)` pairs.
    ///
    /// Later pairs overwrite earlier ones with the same pattern.
    ///
    /// # Errors
    /// [`DictionaryError::InvalidFormat`] if any pattern is empty.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let it = pairs.into_iter();
        let (lower, _) = it.size_hint();
        let mut map = FxHashMap::default();
        map.reserve(lower);

        for (key, value) in it {
            let key = key.into();
            if key.is_empty() {
                return Err(DictionaryError::InvalidFormat(
                    "dictionary keys must not be empty".to_string(),
                ));
            }
            map.insert(key, value.into());
        }

        Ok(Self {
            map,
            plan: OnceCell::new(),
        })
    }

    /// Validates an already-parsed JSON value.
    ///
    /// Only a JSON object whose values are all strings is accepted. `null`,
    /// arrays and primitives are rejected with
    /// [`DictionaryError::InvalidFormat`].
    pub fn from_json_value(value: Value) -> Result<Self, DictionaryError> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(DictionaryError::InvalidFormat(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut pairs = Vec::with_capacity(object.len());
        for (key, value) in object {
            match value {
                Value::String(replacement) => pairs.push((key, replacement)),
                other => {
                    return Err(DictionaryError::InvalidFormat(format!(
                        "value for key {:?} must be a string, found {}",
                        key,
                        json_kind(&other)
                    )))
                }
            }
        }

        Self::from_pairs(pairs)
    }

    /// Parses and validates the flat JSON object format used by custom
    /// dictionary files.
    ///
    /// Syntax errors surface as [`DictionaryError::Parse`], shape errors as
    /// [`DictionaryError::InvalidFormat`].
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Returns a new dictionary holding every entry of `self`, with every entry
    /// of `custom` layered on top. On a key collision the value from `custom`
    /// wins.
    pub fn overlay(&self, custom: &Dictionary) -> Dictionary {
        let mut map = self.map.clone();
        map.extend(
            custom
                .map
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Dictionary {
            map,
            plan: OnceCell::new(),
        }
    }

    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.map.get(pattern).map(String::as_str)
    }

    pub fn contains_key(&self, pattern: &str) -> bool {
        self.map.contains_key(pattern)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over `(pattern, replacement)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Entries sorted by pattern, for stable output and comparisons.
    pub fn to_sorted_map(&self) -> BTreeMap<&str, &str> {
        self.iter().collect()
    }

    /// Serializes to the pretty-printed JSON object format, keys sorted.
    pub fn to_json_pretty(&self) -> Result<String, DictionaryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compiled pass list for this dictionary, built on first use.
    pub(crate) fn plan(&self) -> Result<&SubstitutionPlan, ConversionError> {
        self.plan.get_or_try_init(|| SubstitutionPlan::build(self))
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl Eq for Dictionary {}

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted = self.to_sorted_map();
        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (key, value) in sorted {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
