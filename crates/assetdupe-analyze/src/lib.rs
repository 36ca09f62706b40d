//! Duplicate detection pipeline for assetdupe.
//!
//! Runs five stages in order, each consuming the previous stage's output in
//! full:
//!
//! 1. Collect candidate paths by extension (`assetdupe-scan`)
//! 2. Stat every candidate and group by size (`assetdupe-scan`)
//! 3. Keep only sizes shared by two or more files
//! 4. Compute a full BLAKE3 hash of each remaining file
//! 5. Group by `(size, hash)` and order by reclaimable space
//!
//! Files with a unique size are never read, which skips the bulk of a
//! typical asset tree.
//!
//! ```rust,no_run
//! use assetdupe_analyze::DuplicateScanner;
//! use assetdupe_core::{ScanRequest, ScanState};
//! use std::path::PathBuf;
//!
//! # async fn run() -> Result<(), assetdupe_core::ScanError> {
//! let request = ScanRequest::builder()
//!     .roots(vec![PathBuf::from("/games/Fallout 4/Data")])
//!     .extensions(vec![".dds".to_string(), ".nif".to_string()])
//!     .build()
//!     .unwrap();
//!
//! let state = ScanState::new();
//! let scanner = DuplicateScanner::new();
//! let result = scanner
//!     .scan("scan-1", &request, |p| eprintln!("{}: {:?}", p.stage, p.current), &state)
//!     .await?;
//!
//! println!("Found {} duplicate groups", result.groups.len());
//! println!("Wasted space: {} bytes", result.total_wasted_bytes());
//! # Ok(())
//! # }
//! ```
//!
//! Callers that would rather consume an event stream can use
//! [`start_scan`], which runs the scan on the tokio runtime and returns a
//! receiver plus the scan's cancellation handle.

mod candidates;
mod engine;
mod grouper;
mod hasher;

pub use candidates::select_candidates;
pub use engine::{DuplicateScanner, ScanEvent, scan_for_duplicates, start_scan};
pub use grouper::group_duplicates;
pub use hasher::{hash_candidates, hash_file};

// Re-export core types
pub use assetdupe_core::{
    ContentHash, DuplicateGroup, EngineConfig, HashedFile, ScanError, ScanProgress, ScanRequest,
    ScanResult, ScanStage, ScanState,
};
