//! Behavior switches shared by the mapping and store crates.

use serde::{Deserialize, Serialize};

/// How a raw label is compared against dictionary entries.
///
/// All modes are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// The raw label must equal an entry.
    Absolute,
    /// The raw label must contain an entry.
    #[default]
    Relative,
    /// Try the absolute dictionary first, then fall back to the relative one.
    AbsoluteThenRelative,
}

/// What the label column receives for a raw label that matched nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnmappedPolicy {
    /// Keep the raw label in place.
    KeepRaw,
    /// Write a null, so that a later missing-value filter drops the row.
    #[default]
    Null,
}
