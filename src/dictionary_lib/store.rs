use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{info, warn};

use super::{CustomDictionaryFile, Dictionary, DictionaryError};

#[derive(Debug, Clone)]
struct ActiveState {
    dictionary: Arc<Dictionary>,
    custom: Option<Arc<Dictionary>>,
}

/// Owns the active dictionary and its transitions.
///
/// The active dictionary starts as the default and only changes through
/// [`merge`](Self::merge) (default overlaid with custom entries) or
/// [`reset`](Self::reset). New mappings are built outside the lock and
/// published with a single swap, so readers holding a [`current`](Self::current)
/// snapshot never see a half-merged mapping.
///
/// ```
/// use mayek_normalize::dictionary_lib::{Dictionary, DictionaryStore};
///
/// let store = DictionaryStore::with_default(Dictionary::from_pairs([("a", "1")]).unwrap());
/// store.merge_json(r#"{ "a": "2", "b": "3" }"#).unwrap();
/// assert_eq!(store.current().get("a"), Some("2"));
///
/// assert!(store.merge_json("null").is_err());
/// assert_eq!(store.current().get("b"), Some("3"));
///
/// store.reset();
/// assert_eq!(store.current().get("a"), Some("1"));
/// assert!(!store.current().contains_key("b"));
/// ```
#[derive(Debug)]
pub struct DictionaryStore {
    default: Arc<Dictionary>,
    state: RwLock<ActiveState>,
}

impl DictionaryStore {
    /// Creates a store over the built-in default dictionary.
    pub fn new() -> Result<Self, DictionaryError> {
        Ok(Self::from_default(Dictionary::builtin()?))
    }

    /// Creates a store over a caller-supplied default dictionary.
    pub fn with_default(default: Dictionary) -> Self {
        Self::from_default(Arc::new(default))
    }

    fn from_default(default: Arc<Dictionary>) -> Self {
        let state = ActiveState {
            dictionary: Arc::clone(&default),
            custom: None,
        };
        Self {
            default,
            state: RwLock::new(state),
        }
    }

    /// Snapshot of the active dictionary.
    pub fn current(&self) -> Arc<Dictionary> {
        Arc::clone(&self.state.read().dictionary)
    }

    /// The override mapping last merged, if the store is not at its default.
    pub fn custom(&self) -> Option<Arc<Dictionary>> {
        self.state.read().custom.clone()
    }

    pub fn default_dictionary(&self) -> Arc<Dictionary> {
        Arc::clone(&self.default)
    }

    pub fn is_customized(&self) -> bool {
        self.state.read().custom.is_some()
    }

    /// Makes the active dictionary the default overlaid with `custom`.
    ///
    /// Overrides from an earlier merge are not kept: each merge starts again
    /// from the default.
    pub fn merge(&self, custom: Dictionary) {
        let merged = Arc::new(self.default.overlay(&custom));
        info!(
            custom_entries = custom.len(),
            active_entries = merged.len(),
            "merged custom dictionary"
        );
        let next = ActiveState {
            dictionary: merged,
            custom: Some(Arc::new(custom)),
        };
        *self.state.write() = next;
    }

    /// Validates `value` as a custom dictionary and merges it.
    ///
    /// # Errors
    /// [`DictionaryError::InvalidFormat`] if `value` is not an object of string
    /// values; the active dictionary is left unchanged.
    pub fn merge_value(&self, value: Value) -> Result<(), DictionaryError> {
        let custom = Dictionary::from_json_value(value).map_err(|err| {
            warn!(error = %err, "rejected custom dictionary");
            err
        })?;
        self.merge(custom);
        Ok(())
    }

    /// Parses `json` as a custom dictionary and merges it.
    pub fn merge_json(&self, json: &str) -> Result<(), DictionaryError> {
        let custom = Dictionary::from_json_str(json).map_err(|err| {
            warn!(error = %err, "rejected custom dictionary");
            err
        })?;
        self.merge(custom);
        Ok(())
    }

    /// Discards any merged overrides.
    pub fn reset(&self) {
        let next = ActiveState {
            dictionary: Arc::clone(&self.default),
            custom: None,
        };
        *self.state.write() = next;
        info!("dictionary reset to default");
    }

    /// Merges the custom dictionary saved in `file`, if there is one.
    ///
    /// Returns `Ok(false)` when nothing was saved. A saved file that cannot be
    /// read or parsed is reported and leaves the store unchanged.
    pub fn restore(&self, file: &CustomDictionaryFile) -> Result<bool, DictionaryError> {
        match file.load()? {
            Some(custom) => {
                self.merge(custom);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> DictionaryStore {
        DictionaryStore::with_default(Dictionary::from_pairs([("a", "1")]).unwrap())
    }

    #[test]
    fn merge_overlays_default() {
        let store = store();
        store.merge_value(json!({ "a": "2", "b": "3" })).unwrap();
        let expected = Dictionary::from_pairs([("a", "2"), ("b", "3")]).unwrap();
        assert_eq!(*store.current(), expected);
        assert!(store.is_customized());

        store.reset();
        assert_eq!(*store.current(), *store.default_dictionary());
        assert!(store.custom().is_none());
    }

    #[test]
    fn merge_starts_from_default_each_time() {
        let store = store();
        store.merge_value(json!({ "b": "3" })).unwrap();
        store.merge_value(json!({ "c": "4" })).unwrap();
        let expected = Dictionary::from_pairs([("a", "1"), ("c", "4")]).unwrap();
        assert_eq!(*store.current(), expected);
    }

    #[test]
    fn invalid_merge_keeps_active_dictionary() {
        let store = store();
        store.merge_value(json!({ "b": "3" })).unwrap();
        let before = store.current();

        for value in [json!(null), json!(["a", "b"]), json!(7), json!("a"), json!({ "a": 1 })] {
            let err = store.merge_value(value).unwrap_err();
            assert!(err.is_invalid_format());
            assert!(Arc::ptr_eq(&before, &store.current()));
        }
        assert!(store.merge_json("not json").is_err());
        assert!(Arc::ptr_eq(&before, &store.current()));
    }

    #[test]
    fn snapshots_survive_later_swaps() {
        let store = store();
        let snapshot = store.current();
        store.merge_value(json!({ "a": "9" })).unwrap();
        assert_eq!(snapshot.get("a"), Some("1"));
        assert_eq!(store.current().get("a"), Some("9"));
    }

    #[test]
    fn builtin_store_starts_at_default() {
        let store = DictionaryStore::new().unwrap();
        assert!(!store.is_customized());
        assert_eq!(store.current().len(), 47);
    }
}
