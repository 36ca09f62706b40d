//! Core types and traits for assetdupe.
//!
//! This crate provides the fundamental data structures shared by the
//! scanning and analysis crates: the scan request and its normalization
//! rules, the per-stage file records, duplicate groups and results,
//! progress events, and the cancellation handle.

mod config;
mod error;
mod file;
mod paths;
mod progress;
mod report;
mod state;

pub use config::{
    DEFAULT_EXTENSIONS, EngineConfig, EngineConfigBuilder, ScanRequest, ScanRequestBuilder,
    normalize_extensions,
};
pub use error::ScanError;
pub use file::{ContentHash, HashedFile, SizedFile};
pub use paths::{is_subpath_of_any_root, normalize_roots};
pub use progress::{ScanProgress, ScanStage};
pub use report::{DuplicateGroup, ScanResult};
pub use state::ScanState;
