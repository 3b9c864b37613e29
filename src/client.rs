//! REST client for the dashboard API that lists and validates workflows.

use std::time::{Duration, Instant};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::metrics;
use crate::workflow::{ValidationResult, WorkflowFile};

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a value for use as a single query component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Which upstream call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStage {
    Listing,
    Validation,
}

impl UpstreamStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamStage::Listing => "listing",
            UpstreamStage::Validation => "validation",
        }
    }
}

impl std::fmt::Display for UpstreamStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for `GET /api/workflows` and `GET /api/workflow-detail`.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(Error::Config("dashboard base URL is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flowlens/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the workflow files registered for an application.
    ///
    /// Entries without a string `name` are skipped; a missing `download_url`
    /// is kept so the entry can still be matched.
    pub async fn list_workflow_files(&self, app_id: &str) -> Result<Vec<WorkflowFile>> {
        let url = format!(
            "{}/api/workflows?appId={}",
            self.base_url,
            encode_component(app_id)
        );
        let body = self.get(UpstreamStage::Listing, &url).await?;

        let entries: Vec<Value> = serde_json::from_str(&body)?;
        let files: Vec<WorkflowFile> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();

        info!("Loaded {} workflow files for app {}", files.len(), app_id);
        Ok(files)
    }

    /// Ask the dashboard API to validate the workflow at `download_url`.
    pub async fn validate(&self, download_url: &str) -> Result<ValidationResult> {
        let url = format!(
            "{}/api/workflow-detail?download_url={}",
            self.base_url,
            encode_component(download_url)
        );
        let body = self.get(UpstreamStage::Validation, &url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get(&self, stage: UpstreamStage, url: &str) -> Result<String> {
        debug!(stage = stage.as_str(), url = %url, "upstream request");
        let start = Instant::now();

        let result = self.http.get(url).send().await;
        metrics::record_upstream_duration(start.elapsed(), stage);

        let resp = result?;
        let status = resp.status();
        metrics::record_upstream_request(stage, status.as_u16());

        if !status.is_success() {
            return Err(Error::Upstream {
                stage,
                status: status.as_u16(),
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DashboardClient {
        DashboardClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_encode_component_matches_uri_component_rules() {
        assert_eq!(
            encode_component("https://raw.example.com/a b/kyc.json?ref=main&x=1"),
            "https%3A%2F%2Fraw.example.com%2Fa%20b%2Fkyc.json%3Fref%3Dmain%26x%3D1"
        );
        assert_eq!(encode_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = DashboardClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = DashboardClient::new("  ", Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_list_workflow_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/workflows"))
            .and(query_param("appId", "app-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "kyc.json", "download_url": "https://raw.example.com/kyc.json"},
                {"download_url": "https://raw.example.com/nameless.json"},
                {"name": "broken.json"},
                {"name": "aml.json", "download_url": "https://raw.example.com/aml.json"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let files = client_for(&server).list_workflow_files("app-1").await.unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[1].name, "broken.json");
        assert!(files[1].download_url.is_none());
        assert_eq!(files[2].name, "aml.json");
    }

    #[tokio::test]
    async fn test_listing_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/workflows"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_workflow_files("app-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream {
                stage: UpstreamStage::Listing,
                status: 500
            }
        ));
    }

    #[tokio::test]
    async fn test_listing_not_an_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/workflows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_workflow_files("app-1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "JSON_ERROR");
    }

    #[tokio::test]
    async fn test_validate_sends_encoded_download_url() {
        let server = MockServer::start().await;
        let download_url = "https://raw.example.com/flows/kyc.json?token=a&b=c";
        Mock::given(method("GET"))
            .and(path("/api/workflow-detail"))
            .and(query_param("download_url", download_url))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "issues": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).validate(download_url).await.unwrap();
        assert!(result.success);
        assert!(result.workflow.is_none());
    }

    #[tokio::test]
    async fn test_validate_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/workflow-detail"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .validate("https://raw.example.com/kyc.json")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream {
                stage: UpstreamStage::Validation,
                status: 422
            }
        ));
    }
}
