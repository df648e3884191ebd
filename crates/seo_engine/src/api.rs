//! REST client for the non-streaming backend endpoints.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use seo_logging::seo_debug;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub api_base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("server responded with status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordRequest {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeywordIdea {
    pub keyword: String,
    #[serde(default)]
    pub search_volume: Option<u64>,
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default)]
    pub intent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeywordReport {
    pub keyword: String,
    #[serde(default)]
    pub keywords: Vec<KeywordIdea>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogRequest {
    pub topic: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultSummary {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub versions: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Json,
    Pdf,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Json => "json",
            ArtifactFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultVersion {
    pub id: String,
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    pub format: ArtifactFormat,
    pub report_url: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(self.request(Method::POST, "/api/auth/signin").json(&body))
            .await
    }

    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        self.send(self.request(Method::POST, "/api/auth/signup").json(&body))
            .await
    }

    /// Checks a stored token and returns the user it belongs to.
    pub async fn verify(&self, token: &str) -> Result<User, ApiError> {
        self.send(
            self.client
                .get(self.url("/api/auth/me"))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn research_keywords(&self, req: &KeywordRequest) -> Result<KeywordReport, ApiError> {
        self.send(self.request(Method::POST, "/api/keywords/research").json(req))
            .await
    }

    pub async fn generate_blog(&self, req: &BlogRequest) -> Result<BlogPost, ApiError> {
        self.send(self.request(Method::POST, "/api/blog/generate").json(req))
            .await
    }

    pub async fn list_results(&self) -> Result<Vec<ResultSummary>, ApiError> {
        self.send(self.request(Method::GET, "/api/results")).await
    }

    pub async fn result_version(&self, id: &str, version: u32) -> Result<ResultVersion, ApiError> {
        let path = format!("/api/results/{id}/versions/{version}");
        self.send(self.request(Method::GET, &path)).await
    }

    /// Fetches an externally hosted report artifact.
    pub async fn download_artifact(&self, report_url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(report_url)
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let response = check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        seo_debug!("{} {}", response.status(), response.url().path());
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| status.to_string());
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized(message));
    }
    Err(ApiError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

/// Pulls `detail` or `message` out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(key))
        .map(|field| match field {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(
            error_message(r#"{"detail":"Invalid credentials","message":"x"}"#),
            Some("Invalid credentials".to_string())
        );
        assert_eq!(error_message(r#"{"message":"nope"}"#), Some("nope".to_string()));
        assert_eq!(error_message("<html>"), None);
    }
}
