//! Project scoping for the public API.
//!
//! Callers present a configured public/secret key pair, either as HTTP Basic
//! credentials or as `X-API-Key: <public>:<secret>`. The matching key entry
//! decides which project the request may read.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracelens_core::config::ApiKeyConfig;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// The project a request is authorized to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectScope {
    pub project_id: String,
    pub public_key: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing authentication credentials")]
    MissingCredentials,

    #[error("Malformed authorization header")]
    MalformedHeader,

    #[error("Invalid authentication credentials")]
    InvalidCredentials,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = crate::http::error_body(self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

/// Resolve the caller's project from request headers.
pub fn authenticate(keys: &[ApiKeyConfig], headers: &HeaderMap) -> Result<ProjectScope, AuthError> {
    let (public_key, secret_key) = extract_credentials(headers)?;

    let entry = keys
        .iter()
        .find(|k| k.public_key == public_key && k.secret_key == secret_key)
        .ok_or(AuthError::InvalidCredentials)?;

    Ok(ProjectScope {
        project_id: entry.project_id.clone(),
        public_key,
    })
}

fn extract_credentials(headers: &HeaderMap) -> Result<(String, String), AuthError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
        let encoded = value
            .strip_prefix("Basic ")
            .ok_or(AuthError::MalformedHeader)?;
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedHeader)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedHeader)?;
        return split_pair(&decoded);
    }

    if let Some(value) = headers.get(API_KEY_HEADER) {
        let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
        return split_pair(value.trim());
    }

    Err(AuthError::MissingCredentials)
}

fn split_pair(raw: &str) -> Result<(String, String), AuthError> {
    let (public_key, secret_key) = raw.split_once(':').ok_or(AuthError::MalformedHeader)?;
    if public_key.is_empty() || secret_key.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok((public_key.to_string(), secret_key.to_string()))
}

/// Encode a key pair as an HTTP Basic `Authorization` header value.
pub fn basic_auth_value(public_key: &str, secret_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", public_key, secret_key)))
}
