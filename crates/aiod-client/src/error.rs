use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AiodError>;

/// Context captured from a non-2xx response at classification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiFailure {
    pub status: u16,
    pub detail: Option<String>,
    pub reference: Option<String>,
    pub method: String,
    pub url: String,
}

impl ApiFailure {
    fn usable_detail(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .filter(|detail| !detail.trim().is_empty())
    }
}

impl Display for ApiFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.usable_detail() {
            Some(detail) => write!(f, "API Error {}: {}", self.status, detail),
            None => write!(
                f,
                "API Error {} on {} {}",
                self.status, self.method, self.url
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum AiodError {
    #[error("endpoint undefined: no endpoint named `{0}`")]
    EndpointUndefined(String),

    #[error("not authenticated: create or set a token first")]
    NotAuthenticated,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid asset identifier: `{0}`")]
    InvalidIdentifier(String),

    #[error("{0}")]
    Api(ApiFailure),

    #[error("{0}")]
    AssetNotFound(ApiFailure),

    #[error("{0}")]
    RateLimit(ApiFailure),

    #[error("{0}")]
    Authentication(ApiFailure),

    #[error("{0}")]
    Server(ApiFailure),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("token file error: {0}")]
    TokenFile(String),

    #[error("session state poisoned by a panicked holder")]
    SessionPoisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl AiodError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EndpointUndefined(_) => "ENDPOINT_UNDEFINED",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::Api(_) => "API_ERROR",
            Self::AssetNotFound(_) => "ASSET_NOT_FOUND",
            Self::RateLimit(_) => "RATE_LIMIT",
            Self::Authentication(_) => "AUTHENTICATION_FAILED",
            Self::Server(_) => "SERVER_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::TokenFile(_) => "TOKEN_FILE_ERROR",
            Self::SessionPoisoned => "SESSION_POISONED",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Http(_) => "HTTP_ERROR",
        }
    }

    /// True for conditions raised before any request left the process.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::EndpointUndefined(_)
                | Self::NotAuthenticated
                | Self::InvalidConfig(_)
                | Self::InvalidIdentifier(_)
        )
    }

    #[must_use]
    pub const fn api_failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Api(failure)
            | Self::AssetNotFound(failure)
            | Self::RateLimit(failure)
            | Self::Authentication(failure)
            | Self::Server(failure) => Some(failure),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.api_failure().map(|failure| failure.status)
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.api_failure()
            .and_then(|failure| failure.detail.as_deref())
    }

    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.api_failure()
            .and_then(|failure| failure.reference.as_deref())
    }

    pub fn to_payload(&self, operation: impl Into<String>) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            status: self.status(),
            reference: self.reference().map(ToString::to_string),
        }
    }
}
