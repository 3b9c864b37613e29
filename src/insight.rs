//! Derived metrics for a validation report.
//!
//! Everything here is a pure function of a [`ValidationResult`]: issue
//! counts, the supported countries, distinct module types, SDK response
//! keys, and the URLs referenced by modules tagged with an inferred
//! deployment environment.

use serde::Serialize;

use crate::workflow::{Issue, Module, ValidationResult};

/// Module subtype whose URLs are form endpoints, not service endpoints.
const DYNAMIC_FORM_SUBTYPE: &str = "dynamicForm";

/// Deployment stage inferred from a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Uat,
    Test,
    Staging,
    Prod,
}

impl Environment {
    /// Display order for grouped output.
    pub const ALL: [Environment; 5] = [
        Environment::Dev,
        Environment::Uat,
        Environment::Test,
        Environment::Staging,
        Environment::Prod,
    ];

    /// Infer the environment from substrings of the lower-cased URL.
    ///
    /// Rules are checked in a fixed order and the first match wins,
    /// regardless of where the keyword appears in the URL.
    pub fn infer(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains("dev") {
            Environment::Dev
        } else if url.contains("uat") {
            Environment::Uat
        } else if url.contains("test") {
            Environment::Test
        } else if url.contains("stage") || url.contains("staging") {
            Environment::Staging
        } else {
            Environment::Prod
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Uat => "uat",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL referenced by a module, with its inferred environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlUsage {
    pub url: String,
    pub env: Environment,
}

/// URLs sharing one environment, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvGroup<'a> {
    pub env: Environment,
    pub urls: Vec<&'a str>,
}

/// Everything the report surfaces display, derived from one validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowInsight {
    pub success: bool,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_built_on_builder: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub countries: Vec<String>,
    pub module_types: Vec<String>,
    pub sdk_responses: Vec<String>,
    pub urls: Vec<UrlUsage>,
}

impl WorkflowInsight {
    pub fn from_result(result: &ValidationResult) -> Self {
        let properties = result.properties();
        let modules = result.modules();
        let (error_count, warning_count) = count_issues(&result.issues);

        Self {
            success: result.success,
            name: properties.name,
            description: properties.description,
            is_built_on_builder: properties.is_built_on_builder.unwrap_or(false),
            error_count,
            warning_count,
            countries: supported_countries(modules),
            module_types: distinct_module_types(modules),
            sdk_responses: result.sdk_response_keys(),
            urls: extract_urls(modules),
        }
    }

    /// Group URLs by environment in [`Environment::ALL`] order, skipping
    /// environments with no URLs.
    pub fn urls_by_env(&self) -> Vec<EnvGroup<'_>> {
        Environment::ALL
            .iter()
            .filter_map(|env| {
                let urls: Vec<&str> = self
                    .urls
                    .iter()
                    .filter(|u| u.env == *env)
                    .map(|u| u.url.as_str())
                    .collect();
                (!urls.is_empty()).then_some(EnvGroup { env: *env, urls })
            })
            .collect()
    }
}

/// Count `(errors, warnings)`. Issues of any other type count in neither.
pub fn count_issues(issues: &[Issue]) -> (usize, usize) {
    let errors = issues.iter().filter(|i| i.is_error()).count();
    let warnings = issues.iter().filter(|i| i.is_warning()).count();
    (errors, warnings)
}

/// Countries supported by the first module only.
pub fn supported_countries(modules: &[Module]) -> Vec<String> {
    modules
        .first()
        .and_then(|m| m.properties.countries_supported.clone())
        .unwrap_or_default()
}

/// Distinct `subType` values in first-occurrence order.
pub fn distinct_module_types(modules: &[Module]) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for sub_type in modules.iter().filter_map(|m| m.sub_type.as_ref()) {
        if !types.contains(sub_type) {
            types.push(sub_type.clone());
        }
    }
    types
}

/// URLs of every module that is not a dynamic form.
///
/// The exclusion reads the lowercase `subtype` key, not `subType`.
pub fn extract_urls(modules: &[Module]) -> Vec<UrlUsage> {
    modules
        .iter()
        .filter(|m| m.subtype_lower.as_deref() != Some(DYNAMIC_FORM_SUBTYPE))
        .filter_map(|m| m.properties.url.as_deref())
        .filter(|url| !url.is_empty())
        .map(|url| UrlUsage {
            url: url.to_string(),
            env: Environment::infer(url),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{IssueKind, ModuleProperties};
    use serde_json::json;

    fn issue(kind: Option<&str>) -> Issue {
        Issue {
            kind: kind.map(|k| IssueKind::from(k.to_string())),
            code: None,
            text: "finding".to_string(),
        }
    }

    fn module(sub_type: Option<&str>, subtype_lower: Option<&str>, url: Option<&str>) -> Module {
        Module {
            sub_type: sub_type.map(String::from),
            subtype_lower: subtype_lower.map(String::from),
            properties: ModuleProperties {
                countries_supported: None,
                url: url.map(String::from),
            },
        }
    }

    #[test]
    fn test_count_issues() {
        let issues = vec![
            issue(Some("ERROR")),
            issue(Some("WARNING")),
            issue(Some("ERROR")),
            issue(Some("INFO")),
            issue(Some("error")),
            issue(None),
        ];
        let (errors, warnings) = count_issues(&issues);
        assert_eq!(errors, 2);
        assert_eq!(warnings, 1);
        assert!(errors + warnings < issues.len());
    }

    #[test]
    fn test_counts_cover_all_when_types_are_known() {
        let issues = vec![
            issue(Some("ERROR")),
            issue(Some("WARNING")),
            issue(Some("WARNING")),
        ];
        let (errors, warnings) = count_issues(&issues);
        assert_eq!(errors + warnings, issues.len());
    }

    #[test]
    fn test_environment_inference() {
        assert_eq!(Environment::infer("https://dev.example.com/x"), Environment::Dev);
        assert_eq!(Environment::infer("https://STAGE.example.com"), Environment::Staging);
        assert_eq!(Environment::infer("https://staging.example.com"), Environment::Staging);
        assert_eq!(Environment::infer("https://uat-api.example.com"), Environment::Uat);
        assert_eq!(Environment::infer("https://api.example.com/test/v1"), Environment::Test);
        assert_eq!(Environment::infer("https://api.example.com"), Environment::Prod);
    }

    #[test]
    fn test_environment_precedence() {
        // "test" appears first in the string but "dev" has priority
        assert_eq!(
            Environment::infer("https://test.example.com/dev"),
            Environment::Dev
        );
        assert_eq!(
            Environment::infer("https://stage-uat.example.com"),
            Environment::Uat
        );
        // substring match, not word match
        assert_eq!(
            Environment::infer("https://devices.example.com"),
            Environment::Dev
        );
    }

    #[test]
    fn test_distinct_module_types_keeps_first_occurrence() {
        let modules = vec![
            module(Some("document"), None, None),
            module(Some("face"), None, None),
            module(None, Some("api"), None),
            module(Some("document"), None, None),
            module(Some("api"), None, None),
        ];
        assert_eq!(
            distinct_module_types(&modules),
            vec!["document", "face", "api"]
        );
    }

    #[test]
    fn test_extract_urls_skips_dynamic_forms() {
        let modules = vec![
            module(Some("api"), Some("api"), Some("https://dev.example.com/x")),
            module(Some("form"), Some("dynamicForm"), Some("https://forms.example.com")),
            module(Some("api"), None, Some("")),
            module(Some("api"), None, None),
            module(Some("api"), None, Some("https://api.example.com")),
        ];
        let urls = extract_urls(&modules);
        assert_eq!(
            urls,
            vec![
                UrlUsage {
                    url: "https://dev.example.com/x".to_string(),
                    env: Environment::Dev,
                },
                UrlUsage {
                    url: "https://api.example.com".to_string(),
                    env: Environment::Prod,
                },
            ]
        );
    }

    #[test]
    fn test_exclusion_reads_lowercase_subtype_only() {
        let modules = vec![module(
            Some("dynamicForm"),
            None,
            Some("https://forms.example.com"),
        )];
        assert_eq!(extract_urls(&modules).len(), 1);
    }

    #[test]
    fn test_url_keeps_original_case() {
        let modules = vec![module(None, None, Some("https://UAT.Example.com/Path"))];
        let urls = extract_urls(&modules);
        assert_eq!(urls[0].url, "https://UAT.Example.com/Path");
        assert_eq!(urls[0].env, Environment::Uat);
    }

    #[test]
    fn test_countries_from_first_module_only() {
        let result: ValidationResult = serde_json::from_value(json!({
            "workflow": {
                "modules": [
                    {"subType": "document", "properties": {"countriesSupported": ["ind", "usa"]}},
                    {"subType": "face", "properties": {"countriesSupported": ["bra"]}}
                ]
            }
        }))
        .unwrap();
        let insight = WorkflowInsight::from_result(&result);
        assert_eq!(insight.countries, vec!["ind", "usa"]);

        let result: ValidationResult = serde_json::from_value(json!({
            "workflow": {
                "modules": [
                    {"subType": "document"},
                    {"subType": "face", "properties": {"countriesSupported": ["bra"]}}
                ]
            }
        }))
        .unwrap();
        assert!(WorkflowInsight::from_result(&result).countries.is_empty());
    }

    #[test]
    fn test_insight_from_empty_result() {
        let insight = WorkflowInsight::from_result(&ValidationResult::default());
        assert!(!insight.success);
        assert!(!insight.is_built_on_builder);
        assert_eq!(insight.error_count, 0);
        assert!(insight.countries.is_empty());
        assert!(insight.module_types.is_empty());
        assert!(insight.sdk_responses.is_empty());
        assert!(insight.urls.is_empty());
        assert!(insight.urls_by_env().is_empty());
    }

    #[test]
    fn test_urls_grouped_by_environment() {
        let modules = vec![
            module(None, None, Some("https://api.example.com/a")),
            module(None, None, Some("https://dev.example.com/a")),
            module(None, None, Some("https://api.example.com/b")),
            module(None, None, Some("https://staging.example.com")),
        ];
        let insight = WorkflowInsight {
            urls: extract_urls(&modules),
            ..WorkflowInsight::from_result(&ValidationResult::default())
        };

        let groups = insight.urls_by_env();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].env, Environment::Dev);
        assert_eq!(groups[1].env, Environment::Staging);
        assert_eq!(groups[2].env, Environment::Prod);
        assert_eq!(
            groups[2].urls,
            vec!["https://api.example.com/a", "https://api.example.com/b"]
        );
    }

    #[test]
    fn test_environment_serializes_lowercase() {
        let usage = UrlUsage {
            url: "https://x".to_string(),
            env: Environment::Staging,
        };
        assert_eq!(serde_json::to_value(&usage).unwrap()["env"], "staging");
    }
}
