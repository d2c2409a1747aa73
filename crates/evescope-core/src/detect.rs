use crate::aggregate::{Aggregator, HostCounter};
use crate::models::{Detection, DetectionKind};

/// Minimum DNS queries from one host before it is flagged. Kept modest; the
/// thresholds below are the only tuning points in the engine.
pub const DNS_VOLUME_THRESHOLD: u64 = 50;
pub const BASIC_AUTH_THRESHOLD: u64 = 1;
pub const SELF_SIGNED_TLS_THRESHOLD: u64 = 5;

/// Run all detection rules against the final per-host counters and produce
/// findings. Rules are independent and evaluated in a fixed order; none of
/// them mutates aggregator state, and a host may be flagged by several.
pub fn evaluate(agg: &Aggregator) -> Vec<Detection> {
    let mut detections = Vec::new();

    detect_dns_volume(&mut detections, &agg.dns_by_host);
    detect_basic_auth(&mut detections, &agg.basic_auth_by_host);
    detect_self_signed_tls(&mut detections, &agg.self_signed_by_host);

    tracing::info!(count = detections.len(), "detection complete");
    detections
}

/// Excessive DNS volume per host. Hosts are reported in descending-count
/// order; equal counts keep their first-seen order.
fn detect_dns_volume(detections: &mut Vec<Detection>, dns_by_host: &HostCounter) {
    for (host, count) in dns_by_host.by_count_desc() {
        if count >= DNS_VOLUME_THRESHOLD {
            detections.push(Detection::new(
                DetectionKind::SuspiciousDnsVolume,
                host,
                count,
                format!("High DNS query volume ({count}) may indicate beaconing or exfiltration."),
            ));
        }
    }
}

/// HTTP Basic credentials seen at all from a host. Reported in first-seen
/// order.
fn detect_basic_auth(detections: &mut Vec<Detection>, basic_auth_by_host: &HostCounter) {
    for (host, count) in basic_auth_by_host.iter() {
        if count >= BASIC_AUTH_THRESHOLD {
            detections.push(Detection::new(
                DetectionKind::HttpBasicAuth,
                host,
                count,
                "HTTP Basic credentials observed -- risk of credential exposure.",
            ));
        }
    }
}

/// Repeated self-signed TLS certificates from a host. Reported in first-seen
/// order.
fn detect_self_signed_tls(detections: &mut Vec<Detection>, self_signed_by_host: &HostCounter) {
    for (host, count) in self_signed_by_host.iter() {
        if count >= SELF_SIGNED_TLS_THRESHOLD {
            detections.push(Detection::new(
                DetectionKind::SelfSignedTls,
                host,
                count,
                format!("Multiple self-signed TLS certs observed ({count})."),
            ));
        }
    }
}
