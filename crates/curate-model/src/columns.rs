//! Column roles of a metadata table.
//!
//! Columns are addressed by name only. The configuration is checked against
//! the loaded headers before a record store accepts it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default path column of TCIA-style manifests.
pub const DEFAULT_PATH_COLUMN: &str = "File Location";
/// Default label column of TCIA-style manifests.
pub const DEFAULT_LABEL_COLUMN: &str = "Series Description";
/// Default identifier column of TCIA-style manifests.
pub const DEFAULT_UID_COLUMN: &str = "Series UID";

/// The role a configured column plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    Path,
    Label,
    Uid,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Label => write!(f, "label"),
            Self::Uid => write!(f, "uid"),
        }
    }
}

/// Names of the columns the pipeline reads and rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Column holding file paths.
    pub path: String,
    /// Column holding raw labels.
    pub label: String,
    /// Optional identifier column. Only checked when it is present in the source.
    pub uid: Option<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH_COLUMN.to_string(),
            label: DEFAULT_LABEL_COLUMN.to_string(),
            uid: Some(DEFAULT_UID_COLUMN.to_string()),
        }
    }
}

impl ColumnConfig {
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            uid: None,
        }
    }

    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn without_uid(mut self) -> Self {
        self.uid = None;
        self
    }

    /// Check the configuration against the headers of a loaded source.
    ///
    /// Path and label must exist and be distinct. The uid column is optional
    /// and only has to differ from the other two.
    pub fn validate<S: AsRef<str>>(&self, headers: &[S]) -> Result<()> {
        let roles = [(ColumnRole::Path, &self.path), (ColumnRole::Label, &self.label)];
        for (role, column) in roles {
            if column.trim().is_empty() {
                return Err(ConfigError::EmptyColumnName { role });
            }
            if !headers.iter().any(|h| h.as_ref() == column) {
                return Err(ConfigError::MissingColumn {
                    role,
                    column: column.clone(),
                });
            }
        }
        if self.path == self.label {
            return Err(ConfigError::DuplicateColumn {
                column: self.path.clone(),
                first: ColumnRole::Path,
                second: ColumnRole::Label,
            });
        }
        if let Some(uid) = &self.uid {
            for (role, column) in roles {
                if uid == column {
                    return Err(ConfigError::DuplicateColumn {
                        column: uid.clone(),
                        first: role,
                        second: ColumnRole::Uid,
                    });
                }
            }
        }
        Ok(())
    }

    /// Rename-aware update used after a column rename in the processed view.
    pub fn apply_rename(&mut self, old: &str, new: &str) {
        if self.path == old {
            self.path = new.to_string();
        }
        if self.label == old {
            self.label = new.to_string();
        }
        if let Some(uid) = self.uid.as_mut()
            && uid == old
        {
            *uid = new.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_tcia_manifest() {
        let config = ColumnConfig::default();
        assert_eq!(config.path, "File Location");
        assert_eq!(config.label, "Series Description");
        assert_eq!(config.uid.as_deref(), Some("Series UID"));
    }

    #[test]
    fn validate_accepts_present_columns() {
        let config = ColumnConfig::new("path", "label");
        assert!(config.validate(&["path", "label", "extra"]).is_ok());
    }

    #[test]
    fn validate_rejects_missing_label() {
        let config = ColumnConfig::new("path", "label");
        let err = config.validate(&["path"]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingColumn {
                role: ColumnRole::Label,
                column: "label".to_string()
            }
        );
    }

    #[test]
    fn validate_rejects_shared_column() {
        let config = ColumnConfig::new("x", "x");
        assert!(matches!(
            config.validate(&["x"]),
            Err(ConfigError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn validate_rejects_uid_reusing_path() {
        let config = ColumnConfig::new("p", "l").with_uid("p");
        assert!(matches!(
            config.validate(&["p", "l"]),
            Err(ConfigError::DuplicateColumn {
                second: ColumnRole::Uid,
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_blank_name() {
        let config = ColumnConfig::new(" ", "l");
        assert_eq!(
            config.validate(&["l"]),
            Err(ConfigError::EmptyColumnName {
                role: ColumnRole::Path
            })
        );
    }

    #[test]
    fn rename_follows_roles() {
        let mut config = ColumnConfig::default();
        config.apply_rename("File Location", "file");
        config.apply_rename("Series Description", "label");
        assert_eq!(config.path, "file");
        assert_eq!(config.label, "label");
    }

    #[test]
    fn config_serializes() {
        let json = serde_json::to_string(&ColumnConfig::new("a", "b")).unwrap();
        let round: ColumnConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(round, ColumnConfig::new("a", "b"));
    }
}
