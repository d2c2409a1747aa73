use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Detections: threshold findings produced once per analysis, never mutated
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    SuspiciousDnsVolume,
    HttpBasicAuth,
    SelfSignedTls,
}

impl DetectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionKind::SuspiciousDnsVolume => "suspicious_dns_volume",
            DetectionKind::HttpBasicAuth => "http_basic_auth",
            DetectionKind::SelfSignedTls => "self_signed_tls",
        }
    }
}

impl std::fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Detection {
    pub kind: DetectionKind,
    pub src_ip: String,
    pub count: u64,
    pub reason: String,
}

impl Detection {
    pub fn new(
        kind: DetectionKind,
        src_ip: impl Into<String>,
        count: u64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            src_ip: src_ip.into(),
            count,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult: top-level container, primary API contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub evescope_version: String,
    pub generated_at: DateTime<Utc>,
    pub input_filename: String,
    pub input_sha256: String,
    pub input_size_bytes: u64,
    pub records_analyzed: u64,
    pub records_skipped: u64,
    pub analysis_duration_ms: u64,
}

impl AnalysisMetadata {
    pub fn new() -> Self {
        Self {
            evescope_version: crate::VERSION.to_string(),
            generated_at: Utc::now(),
            input_filename: String::new(),
            input_sha256: String::new(),
            input_size_bytes: 0,
            records_analyzed: 0,
            records_skipped: 0,
            analysis_duration_ms: 0,
        }
    }
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of one analysis run. `totals` enumerates every event kind in
/// first-seen order (absent kinds are counted under the empty key); the
/// `top_*` lists are capped at the requested N, count descending, ties
/// broken by first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: AnalysisMetadata,
    pub totals: Vec<(String, u64)>,
    pub top_alerts: Vec<(String, u64)>,
    pub top_src_ips: Vec<(String, u64)>,
    pub top_dst_ips: Vec<(String, u64)>,
    pub top_dns: Vec<(String, u64)>,
    pub top_http_hosts: Vec<(String, u64)>,
    pub top_tls_ja3: Vec<(String, u64)>,
    pub detections: Vec<Detection>,
}

impl AnalysisResult {
    /// Total number of events folded, summed across all kinds.
    pub fn total_events(&self) -> u64 {
        self.totals.iter().map(|(_, c)| c).sum()
    }
}
