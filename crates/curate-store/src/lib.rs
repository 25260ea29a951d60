//! Record store for imaging metadata.
//!
//! A [`MetadataStore`] keeps the loaded source table untouched and applies
//! every operation to a separate processed view:
//!
//! ```text
//! source ──copy──> processed ──filter / relabel / recode / sample──> processed
//!    ^                                                                   │
//!    └──────────────────────── revert_to_original ───────────────────────┘
//! ```
//!
//! Columns are addressed by name through a [`curate_model::ColumnConfig`]
//! that is validated when the store is built.

mod error;
mod filter;
mod labels;
mod paths;
mod store;

pub use error::{Result, StoreError};
pub use store::MetadataStore;
