//! Shared Supabase HTTP plumbing (GoTrue auth + PostgREST)

use reqwest::RequestBuilder;
use serde::Deserialize;
use std::time::Duration;

use crate::api::error::ApiError;
use crate::config::BackendConfig;

pub(crate) const PROVIDER_NAME: &str = "supabase";

/// PostgREST code for "the single-object request matched zero (or many) rows"
pub(crate) const PGRST_NO_ROWS: &str = "PGRST116";

/// Connection settings shared by the Supabase-backed providers
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("oficina/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            client,
        })
    }

    /// Build a client from the backend section; `None` when URL or key is blank
    pub fn from_config(config: &BackendConfig) -> Result<Option<Self>, ApiError> {
        if config.url.trim().is_empty() || config.anon_key.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(
            config.url.trim(),
            config.anon_key.trim(),
            Duration::from_secs(config.timeout_secs),
        )?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// GET with the project key; `bearer` overrides the anon key for user calls
    pub fn get(&self, url: &str, bearer: Option<&str>) -> RequestBuilder {
        self.with_keys(self.client.get(url), bearer)
    }

    pub fn post(&self, url: &str, bearer: Option<&str>) -> RequestBuilder {
        self.with_keys(self.client.post(url), bearer)
    }

    fn with_keys(&self, builder: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", bearer.unwrap_or(&self.anon_key)),
            )
    }
}

/// Union of the error shapes GoTrue and PostgREST return
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// PostgREST sends a string code, GoTrue a numeric one
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Most descriptive message available, falling back to the raw body
    pub fn message_or(&self, raw: &str) -> String {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| raw.trim().to_string())
    }

    pub fn code_str(&self) -> Option<&str> {
        self.code.as_ref().and_then(|c| c.as_str())
    }
}

/// Map a non-success response to an [`ApiError`], keeping the backend message
pub(crate) fn error_from_response(status: u16, body: &str) -> ApiError {
    let parsed = ErrorBody::parse(body);
    let message = parsed.message_or(body);
    let message = if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        message
    };

    match status {
        401 | 403 => ApiError::unauthorized(PROVIDER_NAME, message),
        // GoTrue reports bad credentials as 400 invalid_grant / invalid_credentials
        400 if matches!(
            parsed.error.as_deref().or(parsed.error_code.as_deref()),
            Some("invalid_grant") | Some("invalid_credentials")
        ) =>
        {
            ApiError::unauthorized(PROVIDER_NAME, message)
        }
        _ => ApiError::http(PROVIDER_NAME, status, message),
    }
}
