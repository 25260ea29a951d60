//! Library side of the `dicom-curate` binary.
//!
//! The binary only parses arguments and prints tables; every command runs
//! through [`pipeline`] so it can be driven from tests.

pub mod logging;
pub mod pipeline;
pub mod types;
