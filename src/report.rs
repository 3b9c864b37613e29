//! Plain-text rendering of a workflow report for the terminal.

use std::fmt::Write;

use crate::page::WorkflowReport;

/// Render a report as plain text.
pub fn render_text(report: &WorkflowReport) -> String {
    let insight = &report.insight;
    let mut out = String::new();

    let _ = writeln!(out, "Deep insights for {}", report.workflow_id);
    let _ = writeln!(out);

    if insight.success {
        let _ = writeln!(out, "✓ Validation passed");
    } else {
        let _ = writeln!(
            out,
            "✗ Validation failed: {} error(s), {} warning(s)",
            insight.error_count, insight.warning_count
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Issues:");
        for issue in &report.result.issues {
            let _ = writeln!(
                out,
                "  [{}] {}: {}",
                issue.tag(),
                issue.code_label(),
                issue.text
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Name: {}", insight.name.as_deref().unwrap_or("-"));
    let _ = writeln!(
        out,
        "Description: {}",
        insight.description.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "Built on builder: {}",
        if insight.is_built_on_builder { "yes" } else { "no" }
    );
    let _ = writeln!(out, "Countries: {}", join_or_none(&insight.countries));
    let _ = writeln!(out, "Modules: {}", join_or_none(&insight.module_types));

    let _ = writeln!(out);
    let _ = writeln!(out, "SDK responses:");
    if insight.sdk_responses.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for key in &insight.sdk_responses {
        let _ = writeln!(out, "  {}", key);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "URLs:");
    let groups = insight.urls_by_env();
    if groups.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for group in groups {
        let _ = writeln!(out, "  {}:", group.env);
        for url in group.urls {
            let _ = writeln!(out, "    {}", url);
        }
    }

    out
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{ValidationResult, WorkflowFile};
    use serde_json::json;

    fn report(result: serde_json::Value) -> WorkflowReport {
        let result: ValidationResult = serde_json::from_value(result).unwrap();
        WorkflowReport::new(
            "app-1",
            WorkflowFile {
                name: "kyc.json".to_string(),
                download_url: Some("https://raw.example.com/kyc.json".to_string()),
            },
            result,
        )
    }

    #[test]
    fn test_failed_report_lists_issues() {
        let text = render_text(&report(json!({
            "success": false,
            "issues": [
                {"type": "ERROR", "code": "E1", "text": "Missing start"},
                {"type": "WARNING", "text": "Slow"}
            ]
        })));
        assert!(text.contains("✗ Validation failed: 1 error(s), 1 warning(s)"));
        assert!(text.contains("[ERROR] E1: Missing start"));
        assert!(text.contains("[WARNING] Issue: Slow"));
    }

    #[test]
    fn test_passed_report_groups_urls() {
        let text = render_text(&report(json!({
            "success": true,
            "issues": [{"type": "WARNING", "text": "hidden"}],
            "workflow": {
                "properties": {"name": "KYC"},
                "modules": [
                    {"subType": "api", "properties": {"url": "https://api.example.com", "countriesSupported": ["ind"]}},
                    {"subType": "api", "properties": {"url": "https://dev.example.com"}}
                ]
            }
        })));
        assert!(text.contains("✓ Validation passed"));
        assert!(!text.contains("hidden"));
        assert!(text.contains("Name: KYC"));
        assert!(text.contains("Countries: ind"));
        assert!(text.contains("Modules: api"));
        let dev = text.find("  dev:").unwrap();
        let prod = text.find("  prod:").unwrap();
        assert!(dev < prod);
    }
}
