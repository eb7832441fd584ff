//! Error handling for the report tools
//!
//! This module provides the error system shared by the token issuer, the
//! HTTP gateway and both report pipelines:
//! - Categorizes errors by type (configuration, transport, API, domain lookup)
//! - Adds context (endpoint, status, request id) to errors for operator diagnosis
//! - Maps every category onto the fixed set of process exit codes
//! - Provides convenient Result type alias

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Exit code for a wrong command line
pub const EXIT_USAGE: i32 = -1;

/// Exit code for unset or unreadable credentials
pub const EXIT_CONFIGURATION: i32 = -2;

/// Exit code when an expected entity is missing from a response
pub const EXIT_LOOKUP: i32 = 1;

/// Exit code for a failed call to the API
pub const EXIT_API: i32 = 3;

/// Main error type for the report tools
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Network or connection errors
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Request validation errors (bad URL, bad header, bad arguments)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Configuration errors (credentials unset or unreadable)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An expected entity is absent from an otherwise successful response
    #[error("{0}")]
    NotFound(String),

    /// Non-2xx response from the API
    #[error("An error occurred calling the App Store Connect API\nStatus:{status}{}\nResponse:\n{body}",
        .request_id.as_ref().map(|id| format!("\nRequest ID:{}", id)).unwrap_or_default())]
    Api {
        status: u16,
        request_id: Option<String>,
        body: String,
    },

    /// Unexpected or internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<ServiceError>,
        context: ErrorContext,
    },
}

impl ServiceError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        ServiceError::Network(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        ServiceError::Timeout(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        ServiceError::Parsing(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ServiceError::Configuration(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    /// Create an API error from a failed response
    pub fn api(status: u16, request_id: Option<String>, body: impl Into<String>) -> Self {
        ServiceError::Api {
            status,
            request_id,
            body: body.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::Internal(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        ServiceError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// The error without any context wrappers
    pub fn root(&self) -> &ServiceError {
        match self {
            ServiceError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::Api { status, .. } => Some(*status),
            ServiceError::WithContext { inner, context } => {
                inner.status_code().or(context.status_code)
            }
            _ => None,
        }
    }

    /// Get the request correlation id if available
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ServiceError::Api { request_id, .. } => request_id.as_deref(),
            ServiceError::WithContext { inner, .. } => inner.request_id(),
            _ => None,
        }
    }

    /// Get the endpoint that was being called, if recorded
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ServiceError::WithContext { inner, context } => {
                context.endpoint.as_deref().or_else(|| inner.endpoint())
            }
            _ => None,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            ServiceError::Configuration(_) => EXIT_CONFIGURATION,
            ServiceError::Validation(_) => EXIT_USAGE,
            ServiceError::Api { .. } | ServiceError::Network(_) | ServiceError::Timeout(_) => EXIT_API,
            ServiceError::NotFound(_) | ServiceError::Parsing(_) | ServiceError::Internal(_) => EXIT_LOOKUP,
            ServiceError::WithContext { .. } => EXIT_LOOKUP,
        }
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Component that generated the error
    pub service: String,

    /// Time the error was recorded
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// Additional context data
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            service: "unknown".to_string(),
            timestamp: Some(chrono::Utc::now()),
            status_code: None,
            endpoint: None,
            data: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context for a specific component
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    /// Add an HTTP status code
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add an endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a context value and return self (builder pattern)
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
        self
    }
}

/// Convert reqwest errors to ServiceError
impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        let mut context = ErrorContext::for_service("http_client");
        if let Some(url) = err.url() {
            context = context.endpoint(url.as_str());
        }

        let service_error = if err.is_timeout() {
            ServiceError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ServiceError::network(format!("Connection error: {}", err))
        } else if err.is_builder() {
            ServiceError::validation(format!("Invalid request: {}", err))
        } else if err.is_redirect() {
            ServiceError::network(format!("Too many redirects: {}", err))
        } else if err.is_decode() || err.is_body() {
            ServiceError::network(format!("Failed to read response body: {}", err))
        } else {
            ServiceError::network(format!("HTTP client error: {}", err))
        };

        if let Some(status) = err.status() {
            service_error.with_context(context.status_code(status.as_u16()))
        } else {
            service_error.with_context(context)
        }
    }
}

/// Convert serde_json errors to ServiceError
impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::parsing(format!("JSON error: {}", err))
            .with_context(ErrorContext::for_service("json"))
    }
}

/// Convert output errors to ServiceError
impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::internal(format!("Failed to write report output: {}", err))
    }
}

/// Convert key material errors to ServiceError
impl From<jsonwebtoken::errors::Error> for ServiceError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ServiceError::configuration(format!("Failed to sign token: {}", err))
            .with_context(ErrorContext::for_service("token"))
    }
}
