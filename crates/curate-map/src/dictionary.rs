//! Acronym dictionaries.
//!
//! A dictionary directory holds one `*.txt` file per canonical label. The file
//! stem is the label, every non-blank line is an entry:
//!
//! ```text
//! acronyms/
//!   absolute/ADC.txt      adc
//!   relative/T2.txt       t2w
//!                         t2_tse
//! ```
//!
//! Canonical labels iterate in lexicographic order, so the first matching
//! label is stable across machines and file systems.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MapError, Result};

/// Sub-directory holding exact-match dictionaries.
pub const ABSOLUTE_DIR: &str = "absolute";
/// Sub-directory holding substring dictionaries.
pub const RELATIVE_DIR: &str = "relative";

/// Canonical label -> lower-cased entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingDictionary {
    entries: BTreeMap<String, Vec<String>>,
}

impl MappingDictionary {
    /// Builds a dictionary from in-memory entries.
    ///
    /// Entries are trimmed and lower-cased; blank entries are discarded.
    pub fn from_entries<K, I, S>(entries: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::default();
        for (label, values) in entries {
            dictionary.insert(label.into(), values);
        }
        dictionary
    }

    /// Loads every `*.txt` file of `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(MapError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }
        let entries = fs::read_dir(dir).map_err(|source| MapError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut dictionary = Self::default();
        for entry in entries {
            let entry = entry.map_err(|source| MapError::DirectoryRead {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
                continue;
            }
            let Some(label) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let contents = fs::read_to_string(&path).map_err(|source| MapError::FileRead {
                path: path.clone(),
                source,
            })?;
            dictionary.insert(label.to_string(), contents.lines());
        }

        debug!(
            dir = %dir.display(),
            labels = dictionary.len(),
            "loaded mapping dictionary"
        );
        Ok(dictionary)
    }

    fn insert<I, S>(&mut self, label: String, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let slot = self.entries.entry(label).or_default();
        for value in values {
            let entry = value.as_ref().trim().to_lowercase();
            if !entry.is_empty() && !slot.contains(&entry) {
                slot.push(entry);
            }
        }
    }

    /// Returns the first label with an entry equal to `lowered`.
    pub fn match_exact(&self, lowered: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, values)| values.iter().any(|value| value == lowered))
            .map(|(label, _)| label.as_str())
    }

    /// Returns the first label with an entry contained in `lowered`.
    pub fn match_contains(&self, lowered: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, values)| values.iter().any(|value| lowered.contains(value.as_str())))
            .map(|(label, _)| label.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, Vec<String>> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The absolute and relative dictionaries of one acronym root.
#[derive(Debug, Clone, Default)]
pub struct DictionarySet {
    pub absolute: MappingDictionary,
    pub relative: MappingDictionary,
}

impl DictionarySet {
    pub fn new(absolute: MappingDictionary, relative: MappingDictionary) -> Self {
        Self { absolute, relative }
    }

    /// Loads `<root>/absolute` and `<root>/relative`.
    ///
    /// A missing sub-directory yields an empty dictionary; a missing root is
    /// an error.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(MapError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        Ok(Self {
            absolute: load_optional(root.join(ABSOLUTE_DIR))?,
            relative: load_optional(root.join(RELATIVE_DIR))?,
        })
    }
}

fn load_optional(dir: PathBuf) -> Result<MappingDictionary> {
    if dir.is_dir() {
        MappingDictionary::load_from_dir(&dir)
    } else {
        warn!(dir = %dir.display(), "dictionary directory missing, using empty dictionary");
        Ok(MappingDictionary::default())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn loads_txt_files_by_stem() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "T2.txt", "t2w\n  T2_TSE \n\n");
        write(dir.path(), "ADC.txt", "adc\n");
        write(dir.path(), "notes.md", "ignored\n");

        let dictionary = MappingDictionary::load_from_dir(dir.path()).unwrap();
        assert_eq!(dictionary.labels().collect::<Vec<_>>(), vec!["ADC", "T2"]);
        assert_eq!(
            dictionary.entries().get("T2").unwrap(),
            &vec!["t2w".to_string(), "t2_tse".to_string()]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = MappingDictionary::load_from_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, MapError::DirectoryNotFound { .. }));
    }

    #[test]
    fn first_label_in_lexicographic_order_wins() {
        let dictionary =
            MappingDictionary::from_entries([("T2", vec!["t2"]), ("FLAIR", vec!["t2"])]);
        assert_eq!(dictionary.match_contains("ax t2 flair"), Some("FLAIR"));
    }

    #[test]
    fn exact_and_contains_differ() {
        let dictionary = MappingDictionary::from_entries([("DWI", vec!["dwi"])]);
        assert_eq!(dictionary.match_exact("dwi"), Some("DWI"));
        assert_eq!(dictionary.match_exact("ax dwi"), None);
        assert_eq!(dictionary.match_contains("ax dwi"), Some("DWI"));
    }

    #[test]
    fn set_tolerates_missing_subdirectory() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join(RELATIVE_DIR), "T1.txt", "t1\n");
        let set = DictionarySet::load(dir.path()).unwrap();
        assert!(set.absolute.is_empty());
        assert_eq!(set.relative.len(), 1);
    }
}
