//! Progress events emitted while a scan runs.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Pipeline stage a progress event belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanStage {
    Collect,
    Stat,
    Hash,
    Group,
    Done,
    Canceled,
    Error,
}

impl ScanStage {
    /// Whether no further events follow this one.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Canceled | Self::Error)
    }
}

/// A single progress event, tagged with the scan it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Identifier supplied by the caller when the scan started.
    pub scan_id: CompactString,
    /// Current stage.
    pub stage: ScanStage,
    /// Items completed within the stage, when counted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<u64>,
    /// Items the stage will process, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Human-readable status line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScanProgress {
    /// Create an event with no counters or message.
    pub fn new(scan_id: impl Into<CompactString>, stage: ScanStage) -> Self {
        Self {
            scan_id: scan_id.into(),
            stage,
            current: None,
            total: None,
            message: None,
        }
    }

    /// Attach a completed-item count.
    pub fn with_current(mut self, current: u64) -> Self {
        self.current = Some(current);
        self
    }

    /// Attach the stage's item total.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Attach a status message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Completion ratio within the stage (0.0 to 1.0), if counters are known.
    pub fn fraction(&self) -> Option<f64> {
        match (self.current, self.total) {
            (Some(_), Some(0)) => Some(1.0),
            (Some(current), Some(total)) => Some((current as f64 / total as f64).min(1.0)),
            _ => None,
        }
    }
}
