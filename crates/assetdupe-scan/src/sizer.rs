//! Concurrent stat of collected candidates, grouped by size.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use assetdupe_core::{ScanError, ScanStage, ScanState, SizedFile};

use crate::concurrent::map_with_concurrency;
use crate::progress::ProgressReporter;

const STAT_MESSAGE: &str = "Reading file sizes…";

/// Candidates grouped by exact size, plus whole-scan totals.
#[derive(Debug, Clone, Default)]
pub struct SizeIndex {
    /// Paths per size, in first-seen order.
    pub groups: IndexMap<u64, Vec<PathBuf>>,
    /// Every collected file, including ones that could not be stat'ed.
    pub total_files: u64,
    /// Sum of the sizes of every file that could be stat'ed.
    pub total_bytes: u64,
}

impl SizeIndex {
    /// Number of files that were successfully sized.
    pub fn sized_files(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Stat every path with up to `concurrency` requests in flight.
///
/// Paths are stat'ed without following symlinks. Non-regular files and
/// paths whose stat fails are dropped. A stat
/// event is emitted every `progress_every` completions; `current` counts
/// completions, so it only ever grows.
pub async fn stat_files(
    paths: &[PathBuf],
    concurrency: usize,
    progress_every: usize,
    state: &ScanState,
    reporter: &ProgressReporter,
) -> Result<SizeIndex, ScanError> {
    let total = paths.len() as u64;
    let every = progress_every.max(1);
    reporter.counted(ScanStage::Stat, 0, Some(total), STAT_MESSAGE);

    let completed = AtomicUsize::new(0);
    let completed = &completed;
    let sized = map_with_concurrency(paths, concurrency, state, |path, _| async move {
        let result = stat_one(path).await;
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % every == 0 {
            reporter.counted(ScanStage::Stat, done as u64, Some(total), STAT_MESSAGE);
        }
        result
    })
    .await?;

    let index = group_by_size(paths.len(), sized);
    tracing::debug!(
        scan_id = %reporter.scan_id(),
        files = index.total_files,
        sized = index.sized_files(),
        sizes = index.groups.len(),
        bytes = index.total_bytes,
        "stat finished"
    );
    Ok(index)
}

/// Group stat results by size and compute the whole-scan totals.
///
/// `collected` is the number of files the collector produced; it is
/// reported as-is even when some of them failed to stat.
pub fn group_by_size(collected: usize, sized: Vec<Option<SizedFile>>) -> SizeIndex {
    let mut index = SizeIndex {
        total_files: collected as u64,
        ..SizeIndex::default()
    };

    for file in sized.into_iter().flatten() {
        index.total_bytes += file.size;
        index.groups.entry(file.size).or_default().push(file.path);
    }

    index
}

async fn stat_one(path: PathBuf) -> Result<SizedFile, ScanError> {
    let metadata = tokio::fs::symlink_metadata(&path)
        .await
        .map_err(|e| ScanError::io(&path, e))?;
    if !metadata.is_file() {
        return Err(ScanError::NotAFile { path });
    }
    Ok(SizedFile::new(path, metadata.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};

    use assetdupe_core::ScanProgress;
    use tempfile::TempDir;

    #[test]
    fn test_group_by_size() {
        let sized = vec![
            Some(SizedFile::new("/r/a.dds", 100)),
            None,
            Some(SizedFile::new("/r/b.dds", 100)),
            Some(SizedFile::new("/r/c.png", 50)),
        ];

        let index = group_by_size(4, sized);

        assert_eq!(index.total_files, 4);
        assert_eq!(index.total_bytes, 250);
        assert_eq!(index.sized_files(), 3);
        assert_eq!(index.groups.keys().copied().collect::<Vec<_>>(), vec![100, 50]);
        assert_eq!(index.groups[&100].len(), 2);
    }

    #[tokio::test]
    async fn test_stat_files_drops_missing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.dds"), vec![0u8; 10]).unwrap();
        fs::write(temp.path().join("b.dds"), vec![1u8; 10]).unwrap();
        fs::write(temp.path().join("c.dds"), vec![2u8; 3]).unwrap();

        let paths = vec![
            temp.path().join("a.dds"),
            temp.path().join("gone.dds"),
            temp.path().join("b.dds"),
            temp.path().join("c.dds"),
            temp.path().to_path_buf(),
        ];

        let reporter = ProgressReporter::silent("t");
        let index = stat_files(&paths, 4, 250, &ScanState::new(), &reporter)
            .await
            .unwrap();

        assert_eq!(index.total_files, 5);
        assert_eq!(index.total_bytes, 23);
        assert_eq!(index.groups[&10], vec![paths[0].clone(), paths[2].clone()]);
        assert_eq!(index.groups[&3], vec![paths[3].clone()]);
    }

    #[tokio::test]
    async fn test_stat_progress_counts_completions() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..10)
            .map(|i| {
                let path = temp.path().join(format!("{i}.dds"));
                fs::write(&path, "x").unwrap();
                path
            })
            .collect();

        let seen: Arc<Mutex<Vec<ScanProgress>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new("t", move |p| sink.lock().unwrap().push(p));
        stat_files(&paths, 3, 5, &ScanState::new(), &reporter)
            .await
            .unwrap();

        let counts: Vec<Option<u64>> = seen.lock().unwrap().iter().map(|p| p.current).collect();
        assert_eq!(counts, vec![Some(0), Some(5), Some(10)]);
        assert!(seen.lock().unwrap().iter().all(|p| p.total == Some(10)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_not_sized() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.dds"), vec![0u8; 10]).unwrap();
        std::os::unix::fs::symlink(temp.path().join("a.dds"), temp.path().join("b.dds")).unwrap();

        let paths = vec![temp.path().join("a.dds"), temp.path().join("b.dds")];
        let reporter = ProgressReporter::silent("t");
        let index = stat_files(&paths, 2, 250, &ScanState::new(), &reporter)
            .await
            .unwrap();

        assert_eq!(index.total_files, 2);
        assert_eq!(index.sized_files(), 1);
        assert_eq!(index.groups[&10], vec![paths[0].clone()]);
    }
}
