use evescope_core::models::AnalysisResult;

/// Render the triage report as Markdown. Layout only; every number comes
/// straight from the analysis result.
pub fn render_markdown(result: &AnalysisResult) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Evescope Report".to_string());
    lines.push(String::new());
    lines.push("## Event totals by type".to_string());
    for (kind, count) in &result.totals {
        let label = if kind.is_empty() { "(unknown)" } else { kind };
        lines.push(format!("- {label}: {count}"));
    }
    lines.push(String::new());

    section(&mut lines, "Top alerts", &result.top_alerts);
    section(&mut lines, "Top source IPs", &result.top_src_ips);
    section(&mut lines, "Top destination IPs", &result.top_dst_ips);
    section(&mut lines, "Top DNS qnames", &result.top_dns);
    section(&mut lines, "Top HTTP hosts", &result.top_http_hosts);
    section(&mut lines, "Top TLS JA3", &result.top_tls_ja3);

    lines.push("## Detections".to_string());
    if result.detections.is_empty() {
        lines.push("_None_".to_string());
    } else {
        for d in &result.detections {
            lines.push(format!(
                "- [{}] src={} count={} -- {}",
                d.kind, d.src_ip, d.count, d.reason,
            ));
        }
    }
    lines.push(String::new());

    lines.push("## Next actions".to_string());
    lines.push(
        "- Pivot to the SIEM on src_ip, dest_ip, ja3, and http host to hunt for related activity."
            .to_string(),
    );
    lines.push(
        "- If HTTP Basic was seen, enforce HTTPS and disable basic auth immediately.".to_string(),
    );
    lines.push(
        "- Investigate the top DNS talkers; verify the domains and consider EDR triage on those hosts."
            .to_string(),
    );

    lines.join("\n")
}

fn section(lines: &mut Vec<String>, title: &str, items: &[(String, u64)]) {
    lines.push(format!("## {title}"));
    if items.is_empty() {
        lines.push("_None_".to_string());
    } else {
        for (name, count) in items {
            lines.push(format!("- {name}: {count}"));
        }
    }
    lines.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_shape_with_detections() {
        let result = evescope_core::analyze::analyze(vec![
            json!({"event_type": "dns", "src_ip": "1.1.1.1", "dns": {"rrname": "example.com"}}),
            json!({"event_type": "http", "src_ip": "1.1.1.1",
                   "http": {"hostname": "test", "authorization": "Basic abc"}}),
        ]);

        let md = render_markdown(&result);
        assert!(md.starts_with("# Evescope Report"));
        assert!(md.contains("## Event totals by type"));
        assert!(md.contains("- dns: 1"));
        assert!(md.contains("## Top HTTP hosts"));
        assert!(md.contains("- test: 1"));
        assert!(md.contains("## Detections"));
        assert!(md.contains("[http_basic_auth] src=1.1.1.1 count=1"));
        assert!(md.contains("## Next actions"));
    }

    #[test]
    fn test_render_empty_result_marks_sections_none() {
        let result = evescope_core::analyze::analyze(Vec::new());
        let md = render_markdown(&result);

        assert!(md.contains("## Top alerts\n_None_"));
        assert!(md.contains("## Detections\n_None_"));
    }
}
