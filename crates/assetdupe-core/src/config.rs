//! Scan request and engine tuning types.

use std::collections::HashSet;
use std::path::PathBuf;

use compact_str::CompactString;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Asset extensions scanned when a request does not name any.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".dds", ".nif", ".png", ".tga", ".jpg", ".jpeg", ".glb", ".fbx", ".obj", ".dae",
];

/// What to scan: root folders, extension filter and size limits.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanRequest {
    /// Root directories to walk.
    pub roots: Vec<PathBuf>,

    /// Extensions to match (empty = built-in asset set).
    #[builder(default)]
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Files smaller than this never form a duplicate group.
    #[builder(default = "1")]
    #[serde(default = "default_min_size")]
    pub min_size_bytes: u64,

    /// Stop collecting once this many files matched (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_files: Option<usize>,
}

fn default_min_size() -> u64 {
    1
}

impl ScanRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.roots {
            Some(ref roots) if roots.iter().any(|r| !r.as_os_str().is_empty()) => Ok(()),
            Some(_) => Err("At least one root folder is required".to_string()),
            None => Err("Root folders are required".to_string()),
        }
    }
}

impl ScanRequest {
    /// Create a new scan request builder.
    pub fn builder() -> ScanRequestBuilder {
        ScanRequestBuilder::default()
    }

    /// Create a request for the given roots with default settings.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            extensions: Vec::new(),
            min_size_bytes: 1,
            max_files: None,
        }
    }

    /// Extensions in canonical form (see [`normalize_extensions`]).
    pub fn normalized_extensions(&self) -> Vec<CompactString> {
        normalize_extensions(&self.extensions)
    }

    /// The file cap, clamped to at least one file when set.
    pub fn effective_max_files(&self) -> Option<usize> {
        self.max_files.map(|n| n.max(1))
    }
}

/// Canonicalize an extension list: trimmed, lowercase, leading dot,
/// deduplicated in first-seen order. An empty list yields
/// [`DEFAULT_EXTENSIONS`].
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<CompactString> {
    let raw: Vec<&str> = extensions
        .iter()
        .map(|e| e.as_ref().trim())
        .filter(|e| !e.is_empty())
        .collect();
    let source: Vec<&str> = if raw.is_empty() {
        DEFAULT_EXTENSIONS.to_vec()
    } else {
        raw
    };

    let mut seen = HashSet::new();
    source
        .into_iter()
        .map(|e| {
            let lower = e.to_lowercase();
            if lower.starts_with('.') {
                CompactString::from(lower)
            } else {
                CompactString::from(format!(".{lower}"))
            }
        })
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

/// Tuning knobs for the scan pipeline.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct EngineConfig {
    /// Workers used to stat candidates.
    #[builder(default = "32")]
    #[serde(default = "default_stat_concurrency")]
    pub stat_concurrency: usize,

    /// Workers used to hash content. Kept low to avoid disk thrashing.
    #[builder(default = "4")]
    #[serde(default = "default_hash_concurrency")]
    pub hash_concurrency: usize,

    /// Emit a collect event every N matched files.
    #[builder(default = "250")]
    #[serde(default = "default_coarse_cadence")]
    pub collect_progress_every: usize,

    /// Emit a stat event every N completed stats.
    #[builder(default = "250")]
    #[serde(default = "default_coarse_cadence")]
    pub stat_progress_every: usize,

    /// Emit a hash event every N completed hashes.
    #[builder(default = "25")]
    #[serde(default = "default_hash_cadence")]
    pub hash_progress_every: usize,

    /// Read buffer used while streaming file content into the hasher.
    #[builder(default = "64 * 1024")]
    #[serde(default = "default_hash_buffer")]
    pub hash_buffer_size: usize,
}

fn default_stat_concurrency() -> usize {
    32
}

fn default_hash_concurrency() -> usize {
    4
}

fn default_coarse_cadence() -> usize {
    250
}

fn default_hash_cadence() -> usize {
    25
}

fn default_hash_buffer() -> usize {
    64 * 1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stat_concurrency: 32,
            hash_concurrency: 4,
            collect_progress_every: 250,
            stat_progress_every: 250,
            hash_progress_every: 25,
            hash_buffer_size: 64 * 1024,
        }
    }
}

impl EngineConfig {
    /// Create a new engine config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Copy of this config with every count clamped to at least one.
    pub fn clamped(&self) -> Self {
        Self {
            stat_concurrency: self.stat_concurrency.max(1),
            hash_concurrency: self.hash_concurrency.max(1),
            collect_progress_every: self.collect_progress_every.max(1),
            stat_progress_every: self.stat_progress_every.max(1),
            hash_progress_every: self.hash_progress_every.max(1),
            hash_buffer_size: self.hash_buffer_size.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ScanRequest::builder()
            .roots(vec![PathBuf::from("/assets")])
            .extensions(vec!["DDS".to_string()])
            .min_size_bytes(4096u64)
            .max_files(100usize)
            .build()
            .unwrap();

        assert_eq!(request.roots, vec![PathBuf::from("/assets")]);
        assert_eq!(request.min_size_bytes, 4096);
        assert_eq!(request.max_files, Some(100));
        assert_eq!(request.normalized_extensions(), vec![".dds"]);
    }

    #[test]
    fn test_request_builder_requires_roots() {
        assert!(ScanRequest::builder().build().is_err());
        assert!(ScanRequest::builder().roots(Vec::<PathBuf>::new()).build().is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request = ScanRequest::new(["/assets"]);
        assert_eq!(request.min_size_bytes, 1);
        assert!(request.max_files.is_none());
        assert_eq!(request.normalized_extensions().len(), DEFAULT_EXTENSIONS.len());
    }

    #[test]
    fn test_request_deserialize_defaults() {
        let request: ScanRequest = serde_json::from_str(r#"{"roots": ["/a"]}"#).unwrap();
        assert_eq!(request.min_size_bytes, 1);
        assert!(request.extensions.is_empty());
    }

    #[test]
    fn test_max_files_clamped() {
        let mut request = ScanRequest::new(["/assets"]);
        request.max_files = Some(0);
        assert_eq!(request.effective_max_files(), Some(1));
    }

    #[test]
    fn test_normalize_extensions() {
        let normalized = normalize_extensions(&["dds", ".PNG", " .dds ", "", "Nif"]);
        assert_eq!(normalized, vec![".dds", ".png", ".nif"]);
    }

    #[test]
    fn test_normalize_extensions_empty_uses_defaults() {
        let normalized = normalize_extensions::<&str>(&[]);
        assert_eq!(normalized.len(), DEFAULT_EXTENSIONS.len());
        assert_eq!(normalized[0], ".dds");

        let blanks = normalize_extensions(&["  ", ""]);
        assert_eq!(blanks, normalized);
    }

    #[test]
    fn test_engine_config_clamped() {
        let config = EngineConfig::builder()
            .stat_concurrency(0usize)
            .hash_concurrency(0usize)
            .build()
            .unwrap()
            .clamped();

        assert_eq!(config.stat_concurrency, 1);
        assert_eq!(config.hash_concurrency, 1);
        assert_eq!(config.hash_progress_every, 25);
    }
}
