//! Scan progress reporting.

use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;

use assetdupe_core::{ScanProgress, ScanStage};

/// Callback receiving every progress event of a scan.
pub type ProgressCallback = Arc<dyn Fn(ScanProgress) + Send + Sync>;

/// Stamps events with the scan id and forwards them to the caller.
#[derive(Clone)]
pub struct ProgressReporter {
    scan_id: CompactString,
    callback: ProgressCallback,
}

impl ProgressReporter {
    /// Create a reporter forwarding to `callback`.
    pub fn new<F>(scan_id: impl Into<CompactString>, callback: F) -> Self
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        Self::with_callback(scan_id, Arc::new(callback))
    }

    /// Create a reporter from an already shared callback.
    pub fn with_callback(scan_id: impl Into<CompactString>, callback: ProgressCallback) -> Self {
        Self {
            scan_id: scan_id.into(),
            callback,
        }
    }

    /// Create a reporter that discards every event.
    pub fn silent(scan_id: impl Into<CompactString>) -> Self {
        Self::new(scan_id, |_| {})
    }

    /// The scan id every event is tagged with.
    pub fn scan_id(&self) -> &CompactString {
        &self.scan_id
    }

    /// Send a pre-built event.
    pub fn emit(&self, progress: ScanProgress) {
        (self.callback)(progress);
    }

    /// Send a stage event carrying only a message.
    pub fn stage(&self, stage: ScanStage, message: impl Into<String>) {
        self.emit(ScanProgress::new(self.scan_id.clone(), stage).with_message(message));
    }

    /// Send a counted stage event.
    pub fn counted(&self, stage: ScanStage, current: u64, total: Option<u64>, message: &str) {
        let mut progress = ScanProgress::new(self.scan_id.clone(), stage)
            .with_current(current)
            .with_message(message);
        progress.total = total;
        self.emit(progress);
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("scan_id", &self.scan_id)
            .field("callback", &"<callback>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_events_tagged_with_scan_id() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new("scan-7", move |p| sink.lock().unwrap().push(p));

        reporter.stage(ScanStage::Group, "Grouping duplicates…");
        reporter.counted(ScanStage::Hash, 25, Some(100), "Hashing");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|p| p.scan_id == "scan-7"));
        assert_eq!(seen[0].stage, ScanStage::Group);
        assert_eq!(seen[1].current, Some(25));
        assert_eq!(seen[1].total, Some(100));
    }
}
