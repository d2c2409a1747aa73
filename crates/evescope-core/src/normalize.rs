use serde_json::Value;

/// Issuer substring marking a self-signed certificate. Literal, case-sensitive
/// match against `tls.issuerdn`; a placeholder heuristic, not chain validation.
pub const SELF_SIGNED_ISSUER_MARKER: &str = "O=Self-signed";

/// Totals key used for records whose `event_type` is absent or not a string.
pub const UNKNOWN_KIND: &str = "";

// ---------------------------------------------------------------------------
// NormalizedEvent: the typed view of one raw EVE record
// ---------------------------------------------------------------------------

/// One record after field extraction. Lives only for the duration of a fold
/// step; the raw record is never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub kind: String,
    pub src_ip: Option<String>,
    pub dest_ip: Option<String>,
    pub detail: EventDetail,
}

/// Kind-specific detail fields. Each variant carries only what the
/// aggregator consumes for that event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    Alert { signature: Option<String> },
    Dns { query_name: Option<String> },
    Http {
        host: Option<String>,
        authorization: Option<String>,
    },
    Tls { ja3: Option<String>, self_signed: bool },
    Other,
}

/// Extract the typed view of one raw record. Total: missing or wrong-typed
/// fields come back as absent, never as an error. Empty strings count as
/// absent throughout, which is what makes the two-name fallbacks
/// (`dest_ip`/`dst_ip`, `hostname`/`http_host`) first-non-empty-wins.
pub fn normalize(record: &Value) -> NormalizedEvent {
    let kind = record
        .get("event_type")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_KIND)
        .to_string();

    let src_ip = str_field(record, "src_ip");
    let dest_ip = str_field(record, "dest_ip").or_else(|| str_field(record, "dst_ip"));

    let detail = match kind.as_str() {
        "alert" => EventDetail::Alert {
            signature: nested_str(record, "alert", "signature"),
        },
        "dns" => EventDetail::Dns {
            // Primary location, with the nested fallback some exporters use.
            query_name: nested_str(record, "dns", "rrname").or_else(|| {
                record
                    .get("dns")
                    .and_then(|d| d.get("query"))
                    .and_then(|q| nonempty_str(q.get("rrname")))
            }),
        },
        "http" => EventDetail::Http {
            host: nested_str(record, "http", "hostname")
                .or_else(|| nested_str(record, "http", "http_host")),
            authorization: nested_str(record, "http", "authorization")
                .or_else(|| nested_str(record, "http", "http_authorization")),
        },
        "tls" => {
            let tls = record.get("tls");
            let subject_present = tls
                .and_then(|t| t.get("subject"))
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            let issuer_marked = tls
                .and_then(|t| t.get("issuerdn"))
                .and_then(Value::as_str)
                .is_some_and(|s| s.contains(SELF_SIGNED_ISSUER_MARKER));
            EventDetail::Tls {
                ja3: tls.and_then(|t| nonempty_str(t.get("ja3"))),
                self_signed: subject_present && issuer_marked,
            }
        }
        _ => EventDetail::Other,
    };

    NormalizedEvent {
        kind,
        src_ip,
        dest_ip,
        detail,
    }
}

fn str_field(record: &Value, key: &str) -> Option<String> {
    nonempty_str(record.get(key))
}

fn nested_str(record: &Value, outer: &str, key: &str) -> Option<String> {
    nonempty_str(record.get(outer).and_then(|o| o.get(key)))
}

fn nonempty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_kind_uses_sentinel() {
        let ev = normalize(&json!({"src_ip": "1.2.3.4"}));
        assert_eq!(ev.kind, UNKNOWN_KIND);
        assert_eq!(ev.detail, EventDetail::Other);
        assert_eq!(ev.src_ip.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_wrong_typed_kind_uses_sentinel() {
        let ev = normalize(&json!({"event_type": 42}));
        assert_eq!(ev.kind, UNKNOWN_KIND);
    }

    #[test]
    fn test_dest_ip_prefers_primary_name() {
        let ev = normalize(&json!({
            "event_type": "flow",
            "dest_ip": "10.0.0.1",
            "dst_ip": "10.0.0.2"
        }));
        assert_eq!(ev.dest_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_dest_ip_falls_back_when_primary_empty() {
        let ev = normalize(&json!({
            "event_type": "flow",
            "dest_ip": "",
            "dst_ip": "10.0.0.2"
        }));
        assert_eq!(ev.dest_ip.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_dns_rrname_nested_fallback() {
        let primary = normalize(&json!({
            "event_type": "dns",
            "dns": {"rrname": "a.example.com"}
        }));
        assert_eq!(
            primary.detail,
            EventDetail::Dns {
                query_name: Some("a.example.com".into())
            }
        );

        let nested = normalize(&json!({
            "event_type": "dns",
            "dns": {"query": {"rrname": "b.example.com"}}
        }));
        assert_eq!(
            nested.detail,
            EventDetail::Dns {
                query_name: Some("b.example.com".into())
            }
        );
    }

    #[test]
    fn test_http_host_and_auth_alternate_names() {
        let ev = normalize(&json!({
            "event_type": "http",
            "http": {"http_host": "alt.example", "http_authorization": "Basic abc"}
        }));
        assert_eq!(
            ev.detail,
            EventDetail::Http {
                host: Some("alt.example".into()),
                authorization: Some("Basic abc".into()),
            }
        );
    }

    #[test]
    fn test_alert_signature_only_for_alert_kind() {
        let ev = normalize(&json!({
            "event_type": "dns",
            "alert": {"signature": "SIG"}
        }));
        assert!(matches!(ev.detail, EventDetail::Dns { .. }));
    }

    #[test]
    fn test_tls_self_signed_requires_subject_and_marker() {
        let both = normalize(&json!({
            "event_type": "tls",
            "tls": {"subject": "CN=a", "issuerdn": "C=XX, O=Self-signed"}
        }));
        assert_eq!(
            both.detail,
            EventDetail::Tls {
                ja3: None,
                self_signed: true
            }
        );

        // No subject: false, not unknown.
        let no_subject = normalize(&json!({
            "event_type": "tls",
            "tls": {"issuerdn": "O=Self-signed"}
        }));
        assert_eq!(
            no_subject.detail,
            EventDetail::Tls {
                ja3: None,
                self_signed: false
            }
        );

        // Marker match is case-sensitive by contract.
        let wrong_case = normalize(&json!({
            "event_type": "tls",
            "tls": {"subject": "CN=a", "issuerdn": "o=self-signed"}
        }));
        assert_eq!(
            wrong_case.detail,
            EventDetail::Tls {
                ja3: None,
                self_signed: false
            }
        );
    }

    #[test]
    fn test_non_object_record_is_all_absent() {
        let ev = normalize(&json!("not an object"));
        assert_eq!(ev.kind, UNKNOWN_KIND);
        assert!(ev.src_ip.is_none());
        assert!(ev.dest_ip.is_none());
        assert_eq!(ev.detail, EventDetail::Other);
    }
}
