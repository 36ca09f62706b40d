//! Full-content hashing of size-collision candidates.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use blake3::Hasher;

use assetdupe_core::{ContentHash, HashedFile, ScanError, ScanStage, ScanState, SizedFile};
use assetdupe_scan::{ProgressReporter, map_with_concurrency};

const HASH_MESSAGE: &str = "Hashing candidates (BLAKE3)…";

/// Hash every candidate with up to `concurrency` files in flight.
///
/// Each candidate is re-stat'ed first without following symlinks; one that
/// vanished, stopped being a regular file, or changed size since the stat
/// stage is dropped. Read errors drop the file too. A hashing worker that
/// panics fails the whole stage with [`ScanError::Task`]. The output keeps
/// one slot per candidate.
pub async fn hash_candidates(
    candidates: &[SizedFile],
    concurrency: usize,
    progress_every: usize,
    buffer_size: usize,
    state: &ScanState,
    reporter: &ProgressReporter,
) -> Result<Vec<Option<HashedFile>>, ScanError> {
    let total = candidates.len() as u64;
    let every = progress_every.max(1);
    reporter.counted(ScanStage::Hash, 0, Some(total), HASH_MESSAGE);

    let completed = AtomicUsize::new(0);
    let completed = &completed;
    let hashed = map_with_concurrency(candidates, concurrency, state, |file, _| async move {
        let result = hash_one(file, buffer_size, state.clone()).await;
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % every == 0 {
            reporter.counted(ScanStage::Hash, done as u64, Some(total), HASH_MESSAGE);
        }
        result
    })
    .await?;

    tracing::debug!(
        scan_id = %reporter.scan_id(),
        candidates = candidates.len(),
        hashed = hashed.iter().flatten().count(),
        "hashing finished"
    );
    Ok(hashed)
}

async fn hash_one(
    file: SizedFile,
    buffer_size: usize,
    state: ScanState,
) -> Result<HashedFile, ScanError> {
    let metadata = tokio::fs::symlink_metadata(&file.path)
        .await
        .map_err(|e| ScanError::io(&file.path, e))?;
    if !metadata.is_file() {
        return Err(ScanError::NotAFile { path: file.path });
    }
    if metadata.len() != file.size {
        return Err(ScanError::SizeChanged {
            path: file.path,
            expected: file.size,
            actual: metadata.len(),
        });
    }

    let path = file.path.clone();
    let (hash, bytes) =
        tokio::task::spawn_blocking(move || hash_file(&path, buffer_size, &state))
            .await
            .map_err(|e| ScanError::Task {
                message: e.to_string(),
            })??;

    if bytes != file.size {
        return Err(ScanError::SizeChanged {
            path: file.path,
            expected: file.size,
            actual: bytes,
        });
    }

    Ok(HashedFile {
        path: file.path,
        size: bytes,
        hash,
    })
}

/// Stream a file through BLAKE3, returning the digest and bytes read.
///
/// Cancellation is checked before every read, so an in-progress file stops
/// after at most one more buffer.
pub fn hash_file(
    path: &Path,
    buffer_size: usize,
    state: &ScanState,
) -> Result<(ContentHash, u64), ScanError> {
    let mut file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;

    loop {
        state.check()?;
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ScanError::io(path, e)),
        };
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    Ok((ContentHash::new(*hasher.finalize().as_bytes()), total))
}
