//! Size-collision filter ahead of hashing.

use assetdupe_core::SizedFile;
use assetdupe_scan::SizeIndex;

/// Flatten every size group that could hold a duplicate.
///
/// A group survives when its size is at least `min_size` and it has two
/// or more members. Everything else has a unique size (or is too small)
/// and is never read.
pub fn select_candidates(index: &SizeIndex, min_size: u64) -> Vec<SizedFile> {
    index
        .groups
        .iter()
        .filter(|(size, paths)| **size >= min_size && paths.len() > 1)
        .flat_map(|(size, paths)| paths.iter().map(|p| SizedFile::new(p.clone(), *size)))
        .collect()
}
