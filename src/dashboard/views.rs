//! HTML views for the workflow report page.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::insight::{EnvGroup, WorkflowInsight};
use crate::page::WorkflowReport;
use crate::workflow::Issue;

const STYLES: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: system-ui, -apple-system, sans-serif;
    background: #0f1115;
    color: #e6e6e6;
    line-height: 1.5;
}
main { max-width: 64rem; margin: 0 auto; padding: 2.5rem 1rem; display: grid; gap: 1.5rem; }
h1 { font-size: 1.5rem; font-weight: 700; }
h1 .primary, .primary { color: #4a9eff; }
.card { background: #1a1d23; border: 1px solid #2c3038; border-radius: 0.5rem; padding: 1.25rem; }
.card h2 { font-size: 1rem; margin-bottom: 0.75rem; }
.muted { color: #9aa0aa; }
.grid-3 { display: grid; grid-template-columns: repeat(auto-fit, minmax(16rem, 1fr)); gap: 1.5rem; }
.badges { display: flex; flex-wrap: wrap; gap: 0.75rem; align-items: center; }
.badge { display: inline-block; border-radius: 0.375rem; padding: 0.3rem 0.75rem; font-size: 0.875rem; font-weight: 600; }
.badge-passed { background: #16a34a; color: #fff; }
.badge-errors { border: 1px solid #ef4444; color: #ef4444; }
.badge-warnings { border: 1px solid #eab308; color: #eab308; }
.link-button { background: none; border: none; color: #4a9eff; text-decoration: underline; cursor: pointer; font-size: 0.875rem; justify-self: start; }
dialog { max-width: 72rem; width: 90vw; margin: auto; background: #1a1d23; color: #e6e6e6; border: 1px solid #2c3038; border-radius: 0.5rem; padding: 1.5rem; }
dialog::backdrop { background: rgba(0, 0, 0, 0.5); backdrop-filter: blur(4px); }
.issues { list-style: none; max-height: 400px; overflow-y: auto; margin-top: 1rem; display: grid; gap: 1rem; font-size: 0.875rem; }
.issues li { display: flex; align-items: flex-start; gap: 0.5rem; }
.tag { display: inline-block; padding: 0.1rem 0.5rem; font-size: 0.75rem; font-weight: 600; border-radius: 0.375rem; }
.tag-error { color: #ef4444; border: 1px solid #ef4444; background: rgba(239, 68, 68, 0.1); }
.tag-warning { color: #ca8a04; border: 1px solid #eab308; background: rgba(234, 179, 8, 0.1); }
.tag-env { color: #4a9eff; border: 1px solid #4a9eff; }
.code { font-weight: 600; }
details > summary { cursor: pointer; font-weight: 600; padding: 0.25rem 0; }
details ul, .card ul { margin-top: 0.75rem; padding-left: 1.25rem; display: grid; gap: 0.35rem; }
.url-list { list-style: none; padding-left: 0; }
.url-list li { word-break: break-all; }
.env-group { margin-top: 0.75rem; }
.alert { border: 1px solid #ef4444; color: #ef4444; border-radius: 0.5rem; padding: 1rem 1.25rem; }
.alert h2 { font-size: 1rem; margin-bottom: 0.25rem; }
"#;

/// Id of the issues overlay, referenced by the details trigger.
const ISSUES_DIALOG_ID: &str = "validation-issues";

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - flowlens" }
                style { (PreEscaped(STYLES)) }
            }
            body {
                main { (body) }
            }
        }
    }
}

/// Full report page.
pub fn workflow_page(report: &WorkflowReport) -> Markup {
    let insight = &report.insight;
    layout(
        &report.workflow_id,
        html! {
            h1 {
                "Deep insights for "
                span.primary { (report.workflow_id) }
            }
            (status_card(insight))
            @if !insight.success {
                (issues_dialog(&report.result.issues))
            }
            div.grid-3 {
                section.card {
                    h2 { "Name & Description" }
                    (name_description(insight))
                }
                section.card {
                    h2 { "Builder Info & Countries" }
                    (builder_and_countries(insight))
                }
                section.card {
                    h2 { "Modules Used" }
                    (string_list(&insight.module_types, "No modules found"))
                }
            }
            section.card {
                details id="sdk-responses" {
                    summary { "SDK Responses" }
                    (string_list(&insight.sdk_responses, "No SDK responses defined"))
                }
            }
            section.card {
                details id="urls-used" {
                    summary { "URLs Used" }
                    (url_groups(&insight.urls_by_env()))
                }
            }
        },
    )
}

fn status_card(insight: &WorkflowInsight) -> Markup {
    html! {
        section.card id="validation-status" {
            h2.muted { "Validation Status" }
            div.badges {
                @if insight.success {
                    span.badge.badge-passed { "✅ Passed" }
                } @else {
                    span.badge.badge-errors { "❌ Errors: " (insight.error_count) }
                    span.badge.badge-warnings { "⚠️ Warnings: " (insight.warning_count) }
                }
            }
        }
    }
}

fn issues_dialog(issues: &[Issue]) -> Markup {
    let open_script = format!("document.getElementById('{}').showModal()", ISSUES_DIALOG_ID);
    html! {
        button.link-button type="button" onclick=(open_script) { "View Validation Details" }
        dialog id=(ISSUES_DIALOG_ID) {
            form method="dialog" {
                h2 { "Validation Issues" }
                p.muted { "These issues were detected during validation." }
                ul.issues {
                    @for issue in issues {
                        li {
                            span.tag.tag-error[issue.is_error()].tag-warning[!issue.is_error()] {
                                (issue.tag())
                            }
                            div {
                                span.code { (issue.code_label()) ":" }
                                " " (issue.text)
                            }
                        }
                    }
                }
                button.link-button type="submit" { "Close" }
            }
        }
    }
}

fn name_description(insight: &WorkflowInsight) -> Markup {
    html! {
        p { strong { "Name: " } (insight.name.as_deref().unwrap_or("-")) }
        p.muted { (insight.description.as_deref().unwrap_or("No description provided")) }
    }
}

fn builder_and_countries(insight: &WorkflowInsight) -> Markup {
    html! {
        p {
            strong { "Built on builder: " }
            @if insight.is_built_on_builder { "Yes" } @else { "No" }
        }
        p { strong { "Countries supported:" } }
        (string_list(&insight.countries, "No countries listed"))
    }
}

fn string_list(items: &[String], empty: &str) -> Markup {
    html! {
        @if items.is_empty() {
            p.muted { (empty) }
        } @else {
            ul {
                @for item in items {
                    li { (item) }
                }
            }
        }
    }
}

/// URLs under one heading per environment, dev first and prod last.
fn url_groups(groups: &[EnvGroup<'_>]) -> Markup {
    html! {
        @if groups.is_empty() {
            p.muted { "No URLs referenced" }
        } @else {
            @for group in groups {
                div.env-group {
                    h3 { span.tag.tag-env { (group.env.as_str()) } }
                    ul.url-list {
                        @for url in &group.urls {
                            li { (url) }
                        }
                    }
                }
            }
        }
    }
}

/// Destructive inline alert shown in place of the report.
pub fn alert_page(title: &str, description: &str) -> Markup {
    layout(
        title,
        html! {
            div.alert role="alert" {
                h2 { (title) }
                p { (description) }
            }
        },
    )
}

pub fn not_found_page(app_id: &str, workflow_id: &str) -> Markup {
    layout(
        "Not found",
        html! {
            h1 { "404 - Not found" }
            p.muted {
                "No workflow named " span.primary { (workflow_id) }
                " is registered for app " span.primary { (app_id) } "."
            }
        },
    )
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
    fn test_passed_page_has_no_details_trigger() {
        let html = workflow_page(&report(json!({"success": true}))).into_string();
        assert!(html.contains("Passed"));
        assert!(!html.contains("View Validation Details"));
        assert!(!html.contains("<dialog"));
        assert!(!html.contains("Errors:"));
    }

    #[test]
    fn test_failed_page_shows_counts_and_issues() {
        let html = workflow_page(&report(json!({
            "success": false,
            "issues": [
                {"type": "ERROR", "code": "E1", "text": "Missing start"},
                {"type": "WARNING", "text": "Slow module"},
                {"text": "Untyped"}
            ]
        })))
        .into_string();

        assert!(html.contains("Errors: 1"));
        assert!(html.contains("Warnings: 1"));
        assert!(html.contains("View Validation Details"));
        assert!(html.contains("E1:"));
        assert!(html.contains("Issue:"));
        assert!(html.contains(">ISSUE<"));
        assert!(!html.contains("Passed"));
    }

    #[test]
    fn test_metadata_sections() {
        let html = workflow_page(&report(json!({
            "success": true,
            "workflow": {
                "properties": {"name": "KYC", "description": "Onboarding", "isBuiltOnBuilder": true},
                "modules": [
                    {"subType": "document", "properties": {"countriesSupported": ["ind"]}},
                    {"subType": "api", "properties": {"url": "https://uat.example.com/v1"}}
                ],
                "sdkResponse": {"decision": "$.result"}
            }
        })))
        .into_string();

        assert!(html.contains("Deep insights for"));
        assert!(html.contains("Name &amp; Description"));
        assert!(html.contains("Onboarding"));
        assert!(html.contains("Yes"));
        assert!(html.contains("<li>ind</li>"));
        assert!(html.contains("<li>document</li>"));
        assert!(html.contains("<li>decision</li>"));
        assert!(html.contains("https://uat.example.com/v1"));
        assert!(html.contains(">uat<"));
    }

    #[test]
    fn test_urls_grouped_under_environment_headings() {
        let html = workflow_page(&report(json!({
            "success": true,
            "workflow": {
                "modules": [
                    {"subType": "api", "properties": {"url": "https://api.example.com/a"}},
                    {"subType": "api", "properties": {"url": "https://dev.example.com/a"}},
                    {"subType": "api", "properties": {"url": "https://api.example.com/b"}}
                ]
            }
        })))
        .into_string();

        let dev_heading = html.find(">dev<").unwrap();
        let prod_heading = html.find(">prod<").unwrap();
        let dev_url = html.find("https://dev.example.com/a").unwrap();
        let prod_a = html.find("https://api.example.com/a").unwrap();
        let prod_b = html.find("https://api.example.com/b").unwrap();

        assert!(dev_heading < dev_url);
        assert!(dev_url < prod_heading);
        assert!(prod_heading < prod_a);
        assert!(prod_a < prod_b);
        assert_eq!(html.matches(">prod<").count(), 1);
        assert!(html.contains(
            "<li>https://api.example.com/a</li><li>https://api.example.com/b</li>"
        ));
    }

    #[test]
    fn test_upstream_strings_are_escaped() {
        let html = workflow_page(&report(json!({
            "success": false,
            "issues": [{"type": "ERROR", "text": "<script>alert(1)</script>"}]
        })))
        .into_string();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_alert_page() {
        let html = alert_page("Error loading workflows", "AppId: app-9").into_string();
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("AppId: app-9"));
    }
}
