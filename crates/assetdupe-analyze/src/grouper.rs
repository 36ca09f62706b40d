//! Grouping of hashed files into duplicate sets.

use std::path::PathBuf;

use indexmap::IndexMap;

use assetdupe_core::{ContentHash, DuplicateGroup, HashedFile, is_subpath_of_any_root};

/// Build duplicate groups from hash results.
///
/// Files are keyed by `(size, hash)`. Files below `min_size` are skipped
/// (the size here is the one verified while hashing). A group is kept when
/// at least two of its members lie strictly inside one of `roots`; members
/// outside every root are removed. Members are sorted, and groups are
/// ordered by reclaimable bytes, largest first, ties in first-seen order.
pub fn group_duplicates(
    hashed: Vec<Option<HashedFile>>,
    roots: &[PathBuf],
    min_size: u64,
) -> Vec<DuplicateGroup> {
    let mut by_content: IndexMap<(u64, ContentHash), Vec<PathBuf>> = IndexMap::new();
    for file in hashed.into_iter().flatten() {
        if file.size < min_size {
            continue;
        }
        by_content.entry((file.size, file.hash)).or_default().push(file.path);
    }

    let mut groups: Vec<DuplicateGroup> = by_content
        .into_iter()
        .filter(|(_, files)| files.len() >= 2)
        .filter_map(|((size, hash), files)| {
            let mut files: Vec<PathBuf> = files
                .into_iter()
                .filter(|p| is_subpath_of_any_root(p, roots))
                .collect();
            if files.len() < 2 {
                tracing::debug!(%hash, "group dropped after root verification");
                return None;
            }
            files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
            Some(DuplicateGroup { hash, size, files })
        })
        .collect();

    // Stable sort keeps first-seen order among equal savings.
    groups.sort_by(|a, b| b.wasted_bytes().cmp(&a.wasted_bytes()));
    groups
}
