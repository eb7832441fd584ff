//! Core abstractions for the report tools
//!
//! This module provides the transport seam every pipeline talks through:
//!
//! - `RequestExecutor`: issues one authenticated request and classifies the response
//! - `HttpGateway`: the HTTPS implementation on top of reqwest
//! - `GatewayBuilder`: builder pattern for creating gateways

pub mod builder;
pub use builder::GatewayBuilder;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::str::FromStr;

use crate::error::mapping::{classify_http_error, is_success_status, map_http_error};
use crate::error::{ErrorContext, Result, ServiceError};
use crate::util::sanitize_for_logging;

/// Trait responsible for executing a single HTTP request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Execute `method url` with the given headers and return the raw body.
    ///
    /// Any status outside `[200, 300)` becomes `ServiceError::Api`.
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HashMap<String, String>,
    ) -> Result<String>;
}

/// HTTPS gateway that opens one connection per call
#[derive(Debug, Clone)]
pub struct HttpGateway {
    /// Request timeout; `None` keeps the transport default
    timeout: Option<Duration>,

    /// User agent sent with every request
    user_agent: String,

    /// Headers sent with every request
    default_headers: HashMap<String, String>,
}

impl Default for HttpGateway {
    fn default() -> Self {
        GatewayBuilder::new().build()
    }
}

impl HttpGateway {
    /// Create a gateway with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for the gateway
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Build a single-use client. Idle pooling is disabled so the connection
    /// is closed as soon as the client is dropped at the end of the call.
    fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .user_agent(self.user_agent.clone());

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| ServiceError::configuration(format!("Failed to build HTTP client: {}", e)))
    }
}

fn to_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let header_name = HeaderName::from_str(key)
            .map_err(|e| ServiceError::validation(format!("Invalid header name: {}", e)))?;

        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ServiceError::validation(format!("Invalid header value for {}: {}", key, e)))?;

        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[async_trait]
impl RequestExecutor for HttpGateway {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HashMap<String, String>,
    ) -> Result<String> {
        url::Url::parse(url)
            .map_err(|e| ServiceError::validation(format!("Invalid URL {}: {}", url, e)))?;

        let mut all_headers = self.default_headers.clone();
        all_headers.extend(headers);
        let header_map = to_header_map(&all_headers)?;

        debug!("Sending request: {} {}", method, sanitize_for_logging(url));
        let start_time = Instant::now();

        // The client, and with it the connection, lives only for this call.
        let client = self.build_http_client()?;
        let context = || ErrorContext::for_service("app-store-connect").endpoint(url);

        let response = client
            .request(method.clone(), url)
            .headers(header_map)
            .send()
            .await
            .map_err(|e| ServiceError::from(e).with_context(context()))?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::from(e).with_context(context().status_code(status.as_u16())))?;

        debug!(
            "{} {} -> {} ({} bytes, {:.2}ms)",
            method,
            sanitize_for_logging(url),
            status.as_u16(),
            body.len(),
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        if is_success_status(status) {
            Ok(body)
        } else {
            warn!(
                "{} {} failed with status {} ({})",
                method,
                sanitize_for_logging(url),
                status.as_u16(),
                classify_http_error(status)
            );
            Err(map_http_error(status, &response_headers, body))
        }
    }
}
