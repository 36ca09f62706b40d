//! Duplicate groups and the final scan result.

use std::path::PathBuf;
use std::time::Duration;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::file::ContentHash;

/// A set of byte-identical files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by all files in this group.
    pub hash: ContentHash,

    /// Size of each file in bytes.
    pub size: u64,

    /// Absolute paths, sorted, at least two.
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Get the number of duplicate files.
    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes reclaimed by keeping a single copy.
    pub fn wasted_bytes(&self) -> u64 {
        self.size.saturating_mul(self.deletable_count() as u64)
    }
}

/// Outcome of one complete scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Identifier supplied by the caller.
    pub scan_id: CompactString,

    /// Normalized absolute roots that were walked.
    pub roots: Vec<PathBuf>,

    /// Normalized extension filter.
    pub extensions: Vec<CompactString>,

    /// Files matched by the collector, whether or not they turned out unique.
    pub total_files_scanned: u64,

    /// Combined size of every file that could be stat'ed.
    pub total_bytes_scanned: u64,

    /// Duplicate groups, largest reclaimable space first.
    pub groups: Vec<DuplicateGroup>,

    /// Wall-clock time the scan took.
    #[serde(default)]
    pub elapsed: Duration,
}

impl ScanResult {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get total number of files across all groups.
    pub fn duplicate_file_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::count).sum()
    }

    /// Total space that could be reclaimed across all groups.
    pub fn total_wasted_bytes(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_bytes).sum()
    }
}
