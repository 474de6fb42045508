//! Dictionary-driven spelling normalization for Meetei Mayek text.
//!
//! Text is rewritten with a substitution dictionary that maps non-canonical
//! grapheme sequences to their canonical spelling. Keys are applied longest
//! first, one pass per key, so a multi-grapheme combination is rewritten
//! before any single grapheme inside it.
//!
//! ```
//! use mayek_normalize::MayekConverter;
//!
//! let converter = MayekConverter::new().unwrap();
//! assert_eq!(converter.convert("ꯑꯣꯁꯤ").unwrap(), "ꯑꯁꯤ");
//!
//! converter.store().merge_json(r#"{ "ꯑꯁꯤ": "ꯑꯗꯨ" }"#).unwrap();
//! assert_eq!(converter.convert("ꯑꯁꯤ").unwrap(), "ꯑꯗꯨ");
//! ```

pub mod dictionary_lib;
pub mod substitution;
pub mod utils;

pub use dictionary_lib::{CustomDictionaryFile, Dictionary, DictionaryError, DictionaryStore};
pub use substitution::{convert, ConversionError};
pub use utils::{find_max_utf8_length, format_thousand};

/// Converter owning its dictionary store.
///
/// Each call to [`convert`](Self::convert) takes a snapshot of the store's
/// active dictionary, so a merge or reset running concurrently affects only
/// later conversions.
#[derive(Debug)]
pub struct MayekConverter {
    store: DictionaryStore,
    is_parallel: bool,
}

impl MayekConverter {
    /// Creates a converter over the built-in default dictionary.
    pub fn new() -> Result<Self, DictionaryError> {
        Ok(Self::with_store(DictionaryStore::new()?))
    }

    pub fn with_store(store: DictionaryStore) -> Self {
        MayekConverter {
            store,
            is_parallel: true,
        }
    }

    pub fn store(&self) -> &DictionaryStore {
        &self.store
    }

    pub fn set_parallel(&mut self, is_parallel: bool) {
        self.is_parallel = is_parallel;
    }

    pub fn get_parallel(&self) -> bool {
        self.is_parallel
    }

    /// Converts `text` with the active dictionary.
    ///
    /// # Errors
    /// [`ConversionError::EmptyInput`] for blank text,
    /// [`ConversionError::ConversionFailed`] if the dictionary cannot be applied.
    pub fn convert(&self, text: &str) -> Result<String, ConversionError> {
        let dictionary = self.store.current();
        if self.is_parallel {
            substitution::convert_parallel(text, &dictionary)
        } else {
            substitution::convert(text, &dictionary)
        }
    }
}
