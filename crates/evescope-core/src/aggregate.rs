use indexmap::IndexMap;

use crate::models::{AnalysisMetadata, AnalysisResult, Detection};
use crate::normalize::{EventDetail, NormalizedEvent};

/// Default cap for the top-N extractions in the final report.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// FrequencyTable: string key -> count, with first-seen tie-break contract
// ---------------------------------------------------------------------------

/// A counting table. Keys keep the order in which they were first
/// incremented; that order is the documented tie-break for [`top_n`]
/// (`FrequencyTable::top_n`), not an accident of the container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: IndexMap<String, u64>,
}

/// Per-host counter for one detection dimension. Structurally identical to a
/// frequency table keyed by host address, so it shares the implementation.
pub type HostCounter = FrequencyTable;

impl FrequencyTable {
    pub fn increment(&mut self, key: impl Into<String>) {
        *self.counts.entry(key.into()).or_insert(0) += 1;
    }

    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Every entry in first-seen order.
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.counts.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    /// Every entry ordered by count descending; equal counts keep first-seen
    /// order (the sort is stable over the insertion sequence).
    pub fn by_count_desc(&self) -> Vec<(String, u64)> {
        let mut sorted = self.entries();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }

    /// Up to `n` highest-count entries, count descending, ties first-seen.
    pub fn top_n(&self, n: usize) -> Vec<(String, u64)> {
        let mut sorted = self.by_count_desc();
        sorted.truncate(n);
        sorted
    }

    /// Add another table into this one. Keys new to `self` are appended in
    /// `other`'s order, so merging shards in a fixed shard order yields the
    /// first-global-occurrence tie-break.
    pub fn merge(&mut self, other: FrequencyTable) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregator: all counting state for one analysis run
// ---------------------------------------------------------------------------

/// Owns every frequency table and per-host counter, mutated only through
/// [`fold`](Aggregator::fold) while records stream in and read-only
/// afterwards. Folding is commutative and associative record-to-record;
/// only top-N tie ordering depends on encounter order.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    pub totals: FrequencyTable,
    pub alert_signatures: FrequencyTable,
    pub src_ips: FrequencyTable,
    pub dst_ips: FrequencyTable,
    pub dns_queries: FrequencyTable,
    pub http_hosts: FrequencyTable,
    pub tls_ja3: FrequencyTable,

    pub dns_by_host: HostCounter,
    pub self_signed_by_host: HostCounter,
    pub basic_auth_by_host: HostCounter,

    records_folded: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_folded(&self) -> u64 {
        self.records_folded
    }

    /// Fold one normalized event into the running state. Absent fields are
    /// skipped from their tables; the totals table counts every record,
    /// sentinel kind included.
    pub fn fold(&mut self, ev: &NormalizedEvent) {
        self.records_folded += 1;
        self.totals.increment(ev.kind.as_str());

        if let Some(src) = &ev.src_ip {
            self.src_ips.increment(src);
        }
        if let Some(dst) = &ev.dest_ip {
            self.dst_ips.increment(dst);
        }

        match &ev.detail {
            EventDetail::Alert { signature } => {
                if let Some(sig) = signature {
                    self.alert_signatures.increment(sig);
                }
            }
            EventDetail::Dns { query_name } => {
                if let Some(name) = query_name {
                    self.dns_queries.increment(name);
                    if let Some(src) = &ev.src_ip {
                        self.dns_by_host.increment(src);
                    }
                }
            }
            EventDetail::Http {
                host,
                authorization,
            } => {
                if let Some(host) = host {
                    self.http_hosts.increment(host);
                }
                if let (Some(auth), Some(src)) = (authorization, &ev.src_ip) {
                    if auth.to_lowercase().contains("basic ") {
                        self.basic_auth_by_host.increment(src);
                    }
                }
            }
            EventDetail::Tls { ja3, self_signed } => {
                if let Some(ja3) = ja3 {
                    self.tls_ja3.increment(ja3);
                }
                if *self_signed {
                    if let Some(src) = &ev.src_ip {
                        self.self_signed_by_host.increment(src);
                    }
                }
            }
            EventDetail::Other => {}
        }
    }

    /// Combine a shard's state into this one by table-wise counter addition.
    /// Merge shards in a fixed order to keep top-N ties deterministic.
    pub fn merge(&mut self, other: Aggregator) {
        self.totals.merge(other.totals);
        self.alert_signatures.merge(other.alert_signatures);
        self.src_ips.merge(other.src_ips);
        self.dst_ips.merge(other.dst_ips);
        self.dns_queries.merge(other.dns_queries);
        self.http_hosts.merge(other.http_hosts);
        self.tls_ja3.merge(other.tls_ja3);
        self.dns_by_host.merge(other.dns_by_host);
        self.self_signed_by_host.merge(other.self_signed_by_host);
        self.basic_auth_by_host.merge(other.basic_auth_by_host);
        self.records_folded += other.records_folded;
    }

    /// Snapshot the final state into the immutable result handed to the
    /// report renderer. Consumes the aggregator; nothing mutates after this.
    pub fn finalize(self, detections: Vec<Detection>, top: usize) -> AnalysisResult {
        let mut metadata = AnalysisMetadata::new();
        metadata.records_analyzed = self.records_folded;

        AnalysisResult {
            metadata,
            totals: self.totals.entries(),
            top_alerts: self.alert_signatures.top_n(top),
            top_src_ips: self.src_ips.top_n(top),
            top_dst_ips: self.dst_ips.top_n(top),
            top_dns: self.dns_queries.top_n(top),
            top_http_hosts: self.http_hosts.top_n(top),
            top_tls_ja3: self.tls_ja3.top_n(top),
            detections,
        }
    }
}
