//! Label mapping for imaging metadata.
//!
//! Raw series descriptions are noisy ("AX T2 FSE", "t2_tse_tra", "T2W"). This
//! crate maps them onto a canonical label set using acronym dictionaries and
//! turns canonical labels into the numeric ids a training pipeline expects.
//!
//! - [`MappingDictionary`]: canonical label -> entries, loaded from a directory
//!   of `*.txt` files
//! - [`LabelNormalizer`]: absolute / relative matching with per-pass ledgers
//! - [`RecodeTable`]: composition of label and numeric maps

#![deny(unsafe_code)]

mod dictionary;
mod error;
mod ledger;
mod normalizer;
mod recode;

pub use dictionary::{ABSOLUTE_DIR, DictionarySet, MappingDictionary, RELATIVE_DIR};
pub use error::{MapError, Result};
pub use ledger::{MappingLedger, UnmappedLedger};
pub use normalizer::{
    BatchOutcome, BatchReport, DEFAULT_MAPPINGS_FILE, DEFAULT_UNMAPPED_FILE, LabelNormalizer,
    NormalizedLabel, NormalizerOptions,
};
pub use recode::{
    LabelMap, NumericMap, RecodeTable, build_label_index, load_label_map, load_numeric_map,
    unmatched_keys,
};
