//! Iterative directory walk producing candidate paths.

use std::collections::HashSet;
use std::fs::FileType;
use std::path::{Path, PathBuf};

use compact_str::CompactString;

use assetdupe_core::{ScanError, ScanStage, ScanState};

use crate::progress::ProgressReporter;

const COLLECT_MESSAGE: &str = "Collecting files…";

/// Options for the collection stage.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Normalized extensions (lowercase, leading dot).
    pub extensions: Vec<CompactString>,
    /// Stop once this many files matched.
    pub max_files: Option<usize>,
    /// Emit a progress event every N matched files.
    pub progress_every: usize,
}

impl CollectOptions {
    /// Options with no file cap and the default progress cadence.
    pub fn new(extensions: Vec<CompactString>) -> Self {
        Self {
            extensions,
            max_files: None,
            progress_every: 250,
        }
    }

    /// Cap the number of collected files.
    pub fn with_max_files(mut self, max_files: Option<usize>) -> Self {
        self.max_files = max_files;
        self
    }

    /// Set the progress cadence.
    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every.max(1);
        self
    }
}

/// Walk `roots` and return every regular file whose extension matches.
///
/// The walk uses an explicit stack rather than recursion. Entries within a
/// directory are visited in name order so repeated scans of an unchanged
/// tree return the same list. Symlinks are neither followed nor collected.
/// Directories that cannot be read are skipped. Once `max_files` is reached
/// the remaining stack is discarded and the partial listing returned.
///
/// Cancellation is checked before each directory and before each entry.
pub async fn collect_files(
    roots: &[PathBuf],
    options: &CollectOptions,
    state: &ScanState,
    reporter: &ProgressReporter,
) -> Result<Vec<PathBuf>, ScanError> {
    reporter.stage(ScanStage::Collect, COLLECT_MESSAGE);

    let extensions: HashSet<&str> = options.extensions.iter().map(|e| e.as_str()).collect();
    let every = options.progress_every.max(1);
    let mut collected: Vec<PathBuf> = Vec::new();
    let mut reported_batches = 0usize;
    let mut stack: Vec<PathBuf> = roots.iter().rev().cloned().collect();
    let mut dirs_read = 0u64;

    while let Some(dir) = stack.pop() {
        state.check()?;

        let entries = match read_dir_sorted(&dir, state).await {
            Ok(entries) => entries,
            Err(ScanError::Canceled) => return Err(ScanError::Canceled),
            Err(err) => {
                tracing::trace!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                continue;
            }
        };
        dirs_read += 1;

        let mut subdirs = Vec::new();
        let mut limit_reached = false;
        for (path, file_type) in entries {
            state.check()?;

            if file_type.is_dir() {
                subdirs.push(path);
                continue;
            }
            if !file_type.is_file() || !matches_extension(&path, &extensions) {
                continue;
            }

            collected.push(path);
            if options.max_files.is_some_and(|max| collected.len() >= max) {
                limit_reached = true;
                break;
            }
        }

        if limit_reached {
            tracing::debug!(files = collected.len(), "file limit reached, stopping walk");
            stack.clear();
        } else {
            stack.extend(subdirs.into_iter().rev());
        }

        if collected.len() / every > reported_batches {
            reported_batches = collected.len() / every;
            reporter.counted(ScanStage::Collect, collected.len() as u64, None, COLLECT_MESSAGE);
            tokio::task::yield_now().await;
        }
    }

    tracing::debug!(
        scan_id = %reporter.scan_id(),
        files = collected.len(),
        dirs = dirs_read,
        "collection finished"
    );
    reporter.counted(ScanStage::Collect, collected.len() as u64, None, COLLECT_MESSAGE);

    Ok(collected)
}

/// Check a path's extension against a normalized extension set.
pub fn matches_extension(path: &Path, extensions: &HashSet<&str>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(format!(".{}", ext.to_lowercase()).as_str()))
}

/// List a directory's entries with their (unfollowed) file types, by name.
async fn read_dir_sorted(
    dir: &Path,
    state: &ScanState,
) -> Result<Vec<(PathBuf, FileType)>, ScanError> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ScanError::io(dir, e))?;

    let mut entries = Vec::new();
    loop {
        state.check()?;
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                // Keep what was listed before the failure.
                tracing::trace!(dir = %dir.display(), error = %err, "directory listing cut short");
                break;
            }
        };
        match entry.file_type().await {
            Ok(file_type) => entries.push((entry.path(), file_type)),
            Err(err) => {
                tracing::trace!(path = %entry.path().display(), error = %err, "unknown entry type");
            }
        }
    }

    entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};

    use assetdupe_core::{ScanProgress, normalize_extensions};
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("textures/armor")).unwrap();
        fs::create_dir(root.join("meshes")).unwrap();

        fs::write(root.join("textures/a.dds"), "aaaa").unwrap();
        fs::write(root.join("textures/armor/b.DDS"), "bbbb").unwrap();
        fs::write(root.join("meshes/c.nif"), "cccc").unwrap();
        fs::write(root.join("readme.txt"), "text").unwrap();
        fs::write(root.join("noext"), "none").unwrap();

        temp
    }

    fn options(exts: &[&str]) -> CollectOptions {
        CollectOptions::new(normalize_extensions(exts))
    }

    #[tokio::test]
    async fn test_collects_matching_extensions() {
        let temp = create_test_tree();
        let roots = vec![temp.path().to_path_buf()];
        let reporter = ProgressReporter::silent("t");

        let files = collect_files(&roots, &options(&[".dds"]), &ScanState::new(), &reporter)
            .await
            .unwrap();

        assert_eq!(
            files,
            vec![
                temp.path().join("textures/a.dds"),
                temp.path().join("textures/armor/b.DDS"),
            ]
        );
    }

    #[tokio::test]
    async fn test_default_extensions_skip_text() {
        let temp = create_test_tree();
        let roots = vec![temp.path().to_path_buf()];
        let reporter = ProgressReporter::silent("t");

        let files = collect_files(&roots, &options(&[]), &ScanState::new(), &reporter)
            .await
            .unwrap();

        assert_eq!(files.len(), 3);
        assert!(!files.iter().any(|p| p.ends_with("readme.txt")));
    }

    #[tokio::test]
    async fn test_max_files_stops_walk() {
        let temp = create_test_tree();
        let roots = vec![temp.path().to_path_buf()];
        let reporter = ProgressReporter::silent("t");
        let opts = options(&[]).with_max_files(Some(2));

        let files = collect_files(&roots, &opts, &ScanState::new(), &reporter)
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_root_is_skipped() {
        let temp = create_test_tree();
        let roots = vec![temp.path().join("does-not-exist"), temp.path().join("meshes")];
        let reporter = ProgressReporter::silent("t");

        let files = collect_files(&roots, &options(&[]), &ScanState::new(), &reporter)
            .await
            .unwrap();

        assert_eq!(files, vec![temp.path().join("meshes/c.nif")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp = create_test_tree();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.dds"), "hide").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let roots = vec![temp.path().to_path_buf()];
        let reporter = ProgressReporter::silent("t");
        let result = collect_files(&roots, &options(&[]), &ScanState::new(), &reporter).await;

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let files = result.unwrap();

        // Privileged users can still read the directory; siblings must be
        // collected either way.
        for sibling in ["meshes/c.nif", "textures/a.dds", "textures/armor/b.DDS"] {
            assert!(files.contains(&temp.path().join(sibling)), "missing {sibling}");
        }
        assert!(files.len() == 3 || files.len() == 4);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_not_followed() {
        let temp = create_test_tree();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("leak.dds"), "leak").unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("linked")).unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("textures/a.dds"),
            temp.path().join("alias.dds"),
        )
        .unwrap();

        let roots = vec![temp.path().to_path_buf()];
        let reporter = ProgressReporter::silent("t");
        let files = collect_files(&roots, &options(&[".dds"]), &ScanState::new(), &reporter)
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.starts_with(temp.path())));
        assert!(!files.iter().any(|p| p.ends_with("alias.dds")));
    }

    #[tokio::test]
    async fn test_canceled_before_walk() {
        let temp = create_test_tree();
        let roots = vec![temp.path().to_path_buf()];
        let reporter = ProgressReporter::silent("t");
        let state = ScanState::new();
        state.cancel();

        let err = collect_files(&roots, &options(&[]), &state, &reporter)
            .await
            .unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn test_progress_cadence() {
        let temp = TempDir::new().unwrap();
        for i in 0..7 {
            fs::write(temp.path().join(format!("f{i}.dds")), "x").unwrap();
        }
        let seen: Arc<Mutex<Vec<ScanProgress>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new("t", move |p| sink.lock().unwrap().push(p));
        let opts = options(&[".dds"]).with_progress_every(3);

        let roots = vec![temp.path().to_path_buf()];
        collect_files(&roots, &opts, &ScanState::new(), &reporter)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.iter().all(|p| p.stage == ScanStage::Collect));
        assert_eq!(seen.first().unwrap().current, None);
        assert_eq!(seen.last().unwrap().current, Some(7));
    }

    #[test]
    fn test_matches_extension() {
        let set: HashSet<&str> = [".dds", ".nif"].into_iter().collect();
        assert!(matches_extension(Path::new("/x/a.dds"), &set));
        assert!(matches_extension(Path::new("/x/a.NIF"), &set));
        assert!(!matches_extension(Path::new("/x/a.png"), &set));
        assert!(!matches_extension(Path::new("/x/.dds"), &set));
        assert!(!matches_extension(Path::new("/x/dds"), &set));
    }
}
