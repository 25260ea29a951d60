pub mod columns;
pub mod error;
pub mod options;

pub use columns::{ColumnConfig, ColumnRole};
pub use error::{ConfigError, Result};
pub use options::{MatchMode, UnmappedPolicy};
