//! HTTP client for a Supabase-compatible backend.
//!
//! Tables go through the PostgREST interface under `/rest/v1`, sessions
//! through the auth service under `/auth/v1` and files through the storage
//! service under `/storage/v1`. Every request carries the project's anon key;
//! once signed in, the session's access token replaces it as the bearer.

mod auth;
mod storage;
mod tables;

use std::time::Duration;

use async_trait::async_trait;
use motodir_core::{AppConfig, Session};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::query::Query;

/// Rows per fetch-all page. Matches the backend's default per-response row
/// cap, so a short page always means the table is exhausted.
const DEFAULT_PAGE_SIZE: usize = 1000;
const DEFAULT_USER_AGENT: &str = "motodir/0.1 (shop-directory)";

/// Gateway backed by the hosted REST, auth and storage services.
///
/// Use [`SupabaseGateway::from_config`] in the binary or
/// [`SupabaseGateway::with_base_url`] to point at a mock server in tests.
pub struct SupabaseGateway {
    client: Client,
    base_url: Url,
    anon_key: String,
    page_size: usize,
    session: watch::Sender<Option<Session>>,
}

impl SupabaseGateway {
    /// Builds a gateway from loaded application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the `reqwest::Client` cannot be built
    /// or [`GatewayError::InvalidBaseUrl`] if the backend URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        Self::build(
            &config.backend_url,
            &config.anon_key,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a gateway with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the `reqwest::Client` cannot be built
    /// or [`GatewayError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        anon_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, GatewayError> {
        Self::build(base_url, anon_key, timeout_secs, DEFAULT_USER_AGENT)
    }

    fn build(
        base_url: &str,
        anon_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| GatewayError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "not a hierarchical URL".to_owned(),
            });
        }

        let (session, _) = watch::channel(None);
        Ok(Self {
            client,
            base_url: parsed,
            anon_key: anon_key.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            session,
        })
    }

    /// Overrides the fetch-all page size. It must not exceed the backend's
    /// per-response row cap, or pages come back short and paging ends early.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Adds the anon key and the bearer token of the current session, or the
    /// anon key again when signed out.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .session
            .borrow()
            .as_ref()
            .map_or_else(|| self.anon_key.clone(), |s| s.access_token.clone());
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn set_session(&self, session: Option<Session>) {
        self.session.send_replace(session);
    }

    /// Sends the request and parses a JSON body, mapping error statuses onto
    /// [`GatewayError`] variants.
    async fn send_json(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Value, GatewayError> {
        let response = check_status(request.send().await?, context).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| GatewayError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

/// Error envelope shared by the REST, auth and storage services. Each service
/// fills a different subset of the fields.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

async fn check_status(response: Response, context: &str) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = classify_error(status.as_u16(), &body, context);
    tracing::debug!(context, status = status.as_u16(), error = %err, "backend request failed");
    Err(err)
}

pub(crate) fn classify_error(status: u16, body: &str, context: &str) -> GatewayError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code.as_ref().map(|c| match c {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_owned());
    let error_code = parsed.error_code.as_deref().unwrap_or_default();

    if error_code == "email_not_confirmed" || message.contains("Email not confirmed") {
        return GatewayError::EmailNotConfirmed;
    }
    if error_code == "invalid_credentials" || message.contains("Invalid login credentials") {
        return GatewayError::InvalidCredentials;
    }
    if code.as_deref() == Some("42501") || status == 401 || status == 403 {
        return GatewayError::PermissionDenied { message };
    }
    if status == 404 {
        return GatewayError::NotFound {
            context: format!("{context}: {message}"),
        };
    }
    GatewayError::Api {
        status,
        code,
        message,
    }
}

#[async_trait]
impl Gateway for SupabaseGateway {
    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn select_rows(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
        self.select_table(table, query).await
    }

    async fn insert_row(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        self.insert_table(table, row).await
    }

    async fn update_rows(
        &self,
        table: &str,
        filter: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        self.update_table(table, filter, patch).await
    }

    async fn delete_rows(&self, table: &str, filter: &Query) -> Result<(), GatewayError> {
        self.delete_table(table, filter).await
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        self.upload_object(bucket, path, bytes, content_type).await
    }
}
