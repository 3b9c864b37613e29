//! Wire types for the dashboard API.
//!
//! Upstream documents are loosely typed, so decoding is lenient: missing
//! objects and fields fall back to defaults, `null` counts as absent, and a
//! field holding the wrong JSON type is dropped instead of failing the whole
//! document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One workflow file registered for an application.
///
/// Returned as a JSON array by `GET /api/workflows?appId=...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowFile {
    /// File name; matched exactly against the requested workflow id.
    pub name: String,

    /// Location the validator downloads the workflow content from.
    ///
    /// Absent or non-string values still leave the entry matchable by name.
    #[serde(default, deserialize_with = "lenient")]
    pub download_url: Option<String>,
}

/// Result of validating one workflow document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    #[serde(default, deserialize_with = "lenient_default")]
    pub success: bool,

    /// Findings in source order.
    #[serde(default, deserialize_with = "lenient_seq")]
    pub issues: Vec<Issue>,

    #[serde(default, deserialize_with = "lenient")]
    pub workflow: Option<WorkflowDoc>,
}

impl ValidationResult {
    /// Workflow properties, or empty ones when the document is missing.
    pub fn properties(&self) -> WorkflowProperties {
        self.workflow
            .as_ref()
            .map(|w| w.properties.clone())
            .unwrap_or_default()
    }

    /// Workflow modules, or an empty slice when the document is missing.
    pub fn modules(&self) -> &[Module] {
        self.workflow
            .as_ref()
            .map(|w| w.modules.as_slice())
            .unwrap_or(&[])
    }

    /// Key names of the SDK response mapping, in document order.
    pub fn sdk_response_keys(&self) -> Vec<String> {
        self.workflow
            .as_ref()
            .map(|w| w.sdk_response.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Kind of a validation finding.
///
/// Matching is exact and case-sensitive: only `"ERROR"` and `"WARNING"`
/// are recognised, anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueKind {
    Error,
    Warning,
    Other(String),
}

impl IssueKind {
    pub fn as_str(&self) -> &str {
        match self {
            IssueKind::Error => "ERROR",
            IssueKind::Warning => "WARNING",
            IssueKind::Other(raw) => raw,
        }
    }
}

impl From<String> for IssueKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ERROR" => IssueKind::Error,
            "WARNING" => IssueKind::Warning,
            _ => IssueKind::Other(raw),
        }
    }
}

impl From<IssueKind> for String {
    fn from(kind: IssueKind) -> Self {
        match kind {
            IssueKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One validation finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<IssueKind>,

    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,

    #[serde(default, deserialize_with = "lenient_default")]
    pub text: String,
}

impl Issue {
    pub fn is_error(&self) -> bool {
        self.kind == Some(IssueKind::Error)
    }

    pub fn is_warning(&self) -> bool {
        self.kind == Some(IssueKind::Warning)
    }

    /// Tag shown next to the issue: the upper-cased type, or `ISSUE`.
    pub fn tag(&self) -> String {
        self.kind
            .as_ref()
            .map(|k| k.as_str().to_uppercase())
            .unwrap_or_else(|| "ISSUE".to_string())
    }

    /// Code shown before the issue text, or `Issue` when absent.
    pub fn code_label(&self) -> &str {
        self.code.as_deref().unwrap_or("Issue")
    }
}

/// The validated workflow document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDoc {
    #[serde(default, deserialize_with = "lenient_default")]
    pub properties: WorkflowProperties,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub modules: Vec<Module>,

    #[serde(rename = "sdkResponse", default, deserialize_with = "lenient_default")]
    pub sdk_response: Map<String, Value>,
}

/// Top-level workflow properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowProperties {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    #[serde(rename = "isBuiltOnBuilder", default, deserialize_with = "lenient")]
    pub is_built_on_builder: Option<bool>,

    /// Properties flowlens does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A sub-unit of a workflow.
///
/// The upstream schema carries both `subType` and `subtype`; they are kept
/// as separate fields and read independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "subType", default, deserialize_with = "lenient")]
    pub sub_type: Option<String>,

    #[serde(rename = "subtype", default, deserialize_with = "lenient")]
    pub subtype_lower: Option<String>,

    #[serde(default, deserialize_with = "lenient_default")]
    pub properties: ModuleProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleProperties {
    #[serde(rename = "countriesSupported", default, deserialize_with = "lenient_opt_seq")]
    pub countries_supported: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Decode a sequence, skipping elements that do not fit `T`.
///
/// `None` when the value is not an array at all.
fn lenient_opt_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(lenient_opt_seq(deserializer)?.unwrap_or_default())
}
