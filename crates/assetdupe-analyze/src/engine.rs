//! Scan orchestration: runs all five stages and owns the terminal events.

use std::time::Instant;

use compact_str::CompactString;
use tokio::sync::mpsc;

use assetdupe_core::{
    EngineConfig, ScanError, ScanProgress, ScanRequest, ScanResult, ScanStage, ScanState,
    normalize_roots,
};
use assetdupe_scan::{CollectOptions, ProgressReporter, collect_files, stat_files};

use crate::candidates::select_candidates;
use crate::grouper::group_duplicates;
use crate::hasher::hash_candidates;

/// Message sent with the `canceled` event.
const CANCELED_MESSAGE: &str = "Scan canceled.";

/// Event delivered by [`start_scan`].
#[derive(Debug)]
pub enum ScanEvent {
    /// Progress update.
    Progress(ScanProgress),
    /// The scan settled. Always the last event.
    Complete(Result<ScanResult, ScanError>),
}

/// Duplicate scanner with configurable tuning.
#[derive(Debug, Clone, Default)]
pub struct DuplicateScanner {
    config: EngineConfig,
}

impl DuplicateScanner {
    /// Create a new scanner with default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new scanner with custom tuning.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config: config.clamped(),
        }
    }

    /// The tuning this scanner runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a full scan.
    ///
    /// `on_progress` receives every event tagged with `scan_id`. A request
    /// without usable roots fails with [`ScanError::NoRoots`] before any
    /// event is sent. Otherwise exactly one terminal event is sent last:
    /// `done` on success, `canceled` when `state` was canceled, `error` for
    /// any other failure. Partial results are never returned.
    pub async fn scan<F>(
        &self,
        scan_id: impl Into<CompactString>,
        request: &ScanRequest,
        on_progress: F,
        state: &ScanState,
    ) -> Result<ScanResult, ScanError>
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        let scan_id = scan_id.into();
        let roots = normalize_roots(&request.roots)?;
        let reporter = ProgressReporter::new(scan_id.clone(), on_progress);

        let outcome = self.run(&scan_id, roots, request, state, &reporter).await;
        settle(outcome, &reporter)
    }

    async fn run(
        &self,
        scan_id: &CompactString,
        roots: Vec<std::path::PathBuf>,
        request: &ScanRequest,
        state: &ScanState,
        reporter: &ProgressReporter,
    ) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        let config = &self.config;
        let extensions = request.normalized_extensions();
        let min_size = request.min_size_bytes;

        tracing::debug!(
            scan_id = %scan_id,
            roots = roots.len(),
            extensions = ?extensions,
            min_size,
            "scan started"
        );

        // 1) Collect
        let options = CollectOptions::new(extensions.clone())
            .with_max_files(request.effective_max_files())
            .with_progress_every(config.collect_progress_every);
        let collected = collect_files(&roots, &options, state, reporter).await?;

        // 2) Stat and group by size
        state.check()?;
        let index = stat_files(
            &collected,
            config.stat_concurrency,
            config.stat_progress_every,
            state,
            reporter,
        )
        .await?;
        drop(collected);

        // 3) Size-collision candidates
        state.check()?;
        let candidates = select_candidates(&index, min_size);
        tracing::debug!(
            scan_id = %scan_id,
            candidates = candidates.len(),
            skipped = index.sized_files() - candidates.len(),
            "hash candidates selected"
        );

        // 4) Hash
        let hashed = hash_candidates(
            &candidates,
            config.hash_concurrency,
            config.hash_progress_every,
            config.hash_buffer_size,
            state,
            reporter,
        )
        .await?;

        // 5) Group
        state.check()?;
        reporter.stage(ScanStage::Group, "Grouping duplicates…");
        let groups = group_duplicates(hashed, &roots, min_size);

        let result = ScanResult {
            scan_id: scan_id.clone(),
            roots,
            extensions,
            total_files_scanned: index.total_files,
            total_bytes_scanned: index.total_bytes,
            groups,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            scan_id = %scan_id,
            files = result.total_files_scanned,
            bytes = result.total_bytes_scanned,
            groups = result.groups.len(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "scan finished"
        );
        reporter.stage(
            ScanStage::Done,
            format!("Found {} duplicate groups.", result.groups.len()),
        );

        Ok(result)
    }
}

/// Emit the terminal event for a failed pipeline run.
///
/// A successful run already sent `done`. Cancellation becomes `canceled`;
/// any other error becomes `error` carrying its message.
fn settle(
    outcome: Result<ScanResult, ScanError>,
    reporter: &ProgressReporter,
) -> Result<ScanResult, ScanError> {
    let scan_id = reporter.scan_id();
    match outcome {
        Ok(result) => Ok(result),
        Err(ScanError::Canceled) => {
            tracing::debug!(scan_id = %scan_id, "scan canceled");
            reporter.stage(ScanStage::Canceled, CANCELED_MESSAGE);
            Err(ScanError::Canceled)
        }
        Err(err) => {
            tracing::warn!(scan_id = %scan_id, error = %err, "scan failed");
            reporter.stage(ScanStage::Error, err.to_string());
            Err(err)
        }
    }
}

/// Run a scan with default tuning.
pub async fn scan_for_duplicates<F>(
    scan_id: impl Into<CompactString>,
    request: &ScanRequest,
    on_progress: F,
    state: &ScanState,
) -> Result<ScanResult, ScanError>
where
    F: Fn(ScanProgress) + Send + Sync + 'static,
{
    DuplicateScanner::new()
        .scan(scan_id, request, on_progress, state)
        .await
}

/// Start a scan in the background.
///
/// Returns a receiver for progress events and the final result, plus the
/// handle used to cancel the scan. The receiver always ends with one
/// [`ScanEvent::Complete`]. Must be called from within a tokio runtime.
pub fn start_scan(
    scan_id: impl Into<CompactString>,
    request: ScanRequest,
    config: EngineConfig,
) -> (mpsc::UnboundedReceiver<ScanEvent>, ScanState) {
    let (tx, rx) = mpsc::unbounded_channel();
    let state = ScanState::new();
    let scan_id = scan_id.into();

    let scan_state = state.clone();
    tokio::spawn(async move {
        let scanner = DuplicateScanner::with_config(config);
        let progress_tx = tx.clone();
        let result = scanner
            .scan(
                scan_id,
                &request,
                move |p| {
                    let _ = progress_tx.send(ScanEvent::Progress(p));
                },
                &scan_state,
            )
            .await;
        let _ = tx.send(ScanEvent::Complete(result));
    });

    (rx, state)
}
