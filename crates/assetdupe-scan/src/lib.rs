//! File collection and sizing stages for assetdupe.
//!
//! This crate provides the first half of the duplicate pipeline:
//!
//! - **Collector** - iterative directory walk filtered by extension
//! - **Sizer** - concurrent stat of every candidate, grouped by size
//! - **Bounded-concurrency mapper** - fixed worker pool shared with the
//!   hashing stage
//! - **Progress reporting** - events stamped with the caller's scan id
//!
//! All stages poll a shared [`ScanState`] and unwind with
//! [`ScanError::Canceled`] once cancellation is requested.
//!
//! # Example
//!
//! ```rust,no_run
//! use assetdupe_scan::{CollectOptions, ProgressReporter, collect_files, stat_files};
//! use assetdupe_core::{ScanState, normalize_extensions};
//! use std::path::PathBuf;
//!
//! # async fn run() -> Result<(), assetdupe_core::ScanError> {
//! let reporter = ProgressReporter::new("scan-1", |p| println!("{}: {:?}", p.stage, p.current));
//! let state = ScanState::new();
//! let roots = vec![PathBuf::from("/games/mods")];
//! let options = CollectOptions::new(normalize_extensions(&["dds", "nif"]));
//!
//! let files = collect_files(&roots, &options, &state, &reporter).await?;
//! let index = stat_files(&files, 32, 250, &state, &reporter).await?;
//! println!("{} distinct sizes", index.groups.len());
//! # Ok(())
//! # }
//! ```

mod collector;
mod concurrent;
mod progress;
mod sizer;

pub use collector::{CollectOptions, collect_files, matches_extension};
pub use concurrent::map_with_concurrency;
pub use progress::{ProgressCallback, ProgressReporter};
pub use sizer::{SizeIndex, group_by_size, stat_files};

// Re-export core types for convenience
pub use assetdupe_core::{ScanError, ScanProgress, ScanStage, ScanState, SizedFile};
