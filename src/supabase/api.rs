//! HTTP helpers for the Supabase auth and REST endpoints with consistent headers,
//! timeouts and error handling. The helpers hold the public anon key only; access
//! tokens are passed in by callers per request and never logged.

use crate::{blog::BackendError, APP_USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// Body fields Supabase services use for human-readable errors, in priority order.
const ERROR_FIELDS: [&str; 4] = ["msg", "error_description", "message", "error"];

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    anon_key: SecretString,
}

impl ApiClient {
    /// # Errors
    /// Returns [`BackendError::Config`] if the HTTP client cannot be built.
    pub fn new(
        base_url: Url,
        anon_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            anon_key,
        })
    }

    #[must_use]
    pub fn anon_key(&self) -> &SecretString {
        &self.anon_key
    }

    /// Joins `path` (which may carry a query string) onto the project URL.
    ///
    /// # Errors
    /// Returns [`BackendError::Config`] if the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        build_url(&self.base_url, path)
    }

    /// Starts a request carrying `apikey` and a bearer token. Without an access
    /// token the anon key is used as the bearer, as Supabase expects.
    ///
    /// # Errors
    /// Returns [`BackendError::Config`] if the endpoint URL is invalid.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        access_token: Option<&SecretString>,
    ) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(path)?;
        let bearer = access_token.unwrap_or(&self.anon_key);

        Ok(self
            .http
            .request(method, url)
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(bearer.expose_secret()))
    }

    /// Sends a request inside a span named after `operation`.
    ///
    /// # Errors
    /// Returns a transport error or, for non-success statuses, [`BackendError::Http`]
    /// with the service's own error text.
    pub async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, BackendError> {
        let span = info_span!("supabase.request", operation);
        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        debug!(operation, status = %response.status(), "supabase response");

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(http_error(response).await)
        }
    }

    /// Sends a request and decodes its JSON body.
    ///
    /// # Errors
    /// See [`Self::send`]; also [`BackendError::Parse`] for undecodable bodies.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = self.send(operation, request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| BackendError::Parse(format!("Failed to decode response: {err}")))
    }
}

/// Builds a URL from the project URL and a path, keeping any path prefix on the
/// base (for self-hosted gateways).
fn build_url(base_url: &Url, path: &str) -> Result<Url, BackendError> {
    let base = base_url.as_str().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');

    Url::parse(&format!("{base}/{path}"))
        .map_err(|err| BackendError::Config(format!("Invalid endpoint {path}: {err}")))
}

/// Maps transport failures, separating timeouts from other network errors.
fn map_request_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        BackendError::Config(format!("Failed to build request: {err}"))
    } else {
        BackendError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn http_error(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    BackendError::Http {
        status: status.as_u16(),
        message: error_message(status, &body),
    }
}

/// Extracts the service's error text from a JSON body, falling back to the
/// sanitized raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let field = ERROR_FIELDS.iter().find_map(|field| {
            json.get(field)
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
        });
        if let Some(text) = field {
            return sanitize_body(text);
        }
    }

    let sanitized = sanitize_body(body);
    if sanitized.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed.")
            .to_string()
    } else {
        sanitized
    }
}

/// Trims and truncates error text for display.
fn sanitize_body(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_paths() {
        let base = Url::parse("https://abc.supabase.co").unwrap();
        assert_eq!(
            build_url(&base, "/auth/v1/signup").unwrap().as_str(),
            "https://abc.supabase.co/auth/v1/signup"
        );

        let base = Url::parse("https://gateway.local/project/").unwrap();
        assert_eq!(
            build_url(&base, "rest/v1/posts?select=*&order=created_at.desc")
                .unwrap()
                .as_str(),
            "https://gateway.local/project/rest/v1/posts?select=*&order=created_at.desc"
        );
    }

    #[test]
    fn error_message_prefers_service_fields() {
        assert_eq!(
            error_message(
                StatusCode::BAD_REQUEST,
                r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#
            ),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(
                StatusCode::BAD_REQUEST,
                r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#
            ),
            "Email not confirmed"
        );
        assert_eq!(
            error_message(
                StatusCode::UNAUTHORIZED,
                r#"{"code":"42501","message":"new row violates row-level security policy"}"#
            ),
            "new row violates row-level security policy"
        );
    }

    #[test]
    fn error_message_skips_blank_fields() {
        assert_eq!(
            error_message(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"msg":"  ","error_description":"","message":"Signup requires a valid password"}"#
            ),
            "Signup requires a valid password"
        );
    }

    #[test]
    fn error_message_falls_back_to_body_or_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "  upstream down \n"),
            "upstream down"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");

        let long = "x".repeat(500);
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, &long).len(),
            MAX_ERROR_CHARS
        );
    }
}
