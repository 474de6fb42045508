use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Dictionary, DictionaryError};

/// Environment variable that overrides where the custom dictionary is saved.
pub const DICT_PATH_ENV: &str = "MAYEK_DICT_PATH";

const APP_DIR: &str = "mayek-normalize";
const FILE_NAME: &str = "custom_dictionary.json";

/// Location of the saved custom dictionary.
///
/// Only the user's override mapping is saved, never the merged result, so a
/// newer built-in default still applies underneath after an upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDictionaryFile {
    path: PathBuf,
}

impl CustomDictionaryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$MAYEK_DICT_PATH` if set, else `<config dir>/mayek-normalize/custom_dictionary.json`.
    ///
    /// `None` if neither is available (no config directory on this platform).
    pub fn default_location() -> Option<Self> {
        location_from(std::env::var_os(DICT_PATH_ENV), dirs::config_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the saved dictionary; `Ok(None)` if nothing has been saved.
    pub fn load(&self) -> Result<Option<Dictionary>, DictionaryError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        let dictionary = Dictionary::from_json_str(&json)?;
        debug!(path = %self.path.display(), entries = dictionary.len(), "loaded saved dictionary");
        Ok(Some(dictionary))
    }

    /// Writes `custom` as pretty JSON, creating parent directories as needed.
    pub fn save(&self, custom: &Dictionary) -> Result<(), DictionaryError> {
        let json = custom.to_json_pretty()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        fs::write(&self.path, json).map_err(|err| self.io_error(err))?;
        debug!(path = %self.path.display(), entries = custom.len(), "saved custom dictionary");
        Ok(())
    }

    /// Deletes the saved dictionary. A missing file is not an error.
    pub fn remove(&self) -> Result<(), DictionaryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn io_error(&self, source: io::Error) -> DictionaryError {
        DictionaryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn location_from(
    env_path: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Option<CustomDictionaryFile> {
    match env_path {
        Some(path) if !path.is_empty() => Some(CustomDictionaryFile::new(path)),
        _ => config_dir.map(|dir| CustomDictionaryFile::new(dir.join(APP_DIR).join(FILE_NAME))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_load_remove() {
        let dir = tempdir().unwrap();
        let file = CustomDictionaryFile::new(dir.path().join("nested").join("dict.json"));
        assert!(file.load().unwrap().is_none());

        let custom = Dictionary::from_pairs([("ꯁꯣꯪ", "ꯁꯣꯡ"), ("x", "")]).unwrap();
        file.save(&custom).unwrap();
        assert_eq!(file.load().unwrap(), Some(custom));

        file.remove().unwrap();
        assert!(file.load().unwrap().is_none());
        // removing twice is fine
        file.remove().unwrap();
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.json");
        fs::write(&path, "[\"not\", \"a\", \"map\"]").unwrap();
        let err = CustomDictionaryFile::new(&path).load().unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn env_override_wins() {
        let file = location_from(Some("/tmp/x.json".into()), Some(PathBuf::from("/cfg"))).unwrap();
        assert_eq!(file.path(), Path::new("/tmp/x.json"));

        let file = location_from(Some(OsString::new()), Some(PathBuf::from("/cfg"))).unwrap();
        assert_eq!(
            file.path(),
            Path::new("/cfg/mayek-normalize/custom_dictionary.json")
        );

        assert!(location_from(None, None).is_none());
    }
}
