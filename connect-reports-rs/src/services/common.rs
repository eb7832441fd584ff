//! Common utilities for the report pipelines
//!
//! This module provides the request echo, header assembly and response
//! decoding shared by both pipelines.

use std::collections::HashMap;
use std::io::Write;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::core::RequestExecutor;
use crate::error::{ErrorContext, Result, ServiceError};
use crate::ui::{blue, green};

/// Media type required by the diagnostics and metrics endpoints
pub const XCODE_METRICS_MEDIA_TYPE: &str = "application/vnd.apple.xcode-metrics+json";

/// Assemble request headers for an authenticated call
pub fn auth_headers(bearer: &str, accept: Option<&str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), bearer.to_string());
    if let Some(accept) = accept {
        headers.insert("Accept".to_string(), accept.to_string());
    }
    headers
}

/// Echo the request line to the report output, then issue a GET
pub async fn fetch<E, W>(
    executor: &E,
    out: &mut W,
    url: &str,
    headers: HashMap<String, String>,
) -> Result<String>
where
    E: RequestExecutor + ?Sized,
    W: Write + Send,
{
    writeln!(out, "{} {}", green(Method::GET), blue(url))?;
    out.flush()?;
    executor.request(Method::GET, url, headers).await
}

/// Decode a response body, naming the stage in the error on failure
pub fn decode<T: DeserializeOwned>(body: &str, stage: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| unexpected(stage, e))
}

/// Decode one entry of an already parsed response at the point it is used
pub fn decode_value<T: DeserializeOwned>(value: &Value, stage: &str) -> Result<T> {
    T::deserialize(value).map_err(|e| unexpected(stage, e))
}

fn unexpected(stage: &str, err: serde_json::Error) -> ServiceError {
    ServiceError::parsing(format!("unexpected {}: {}", stage, err))
        .with_context(ErrorContext::for_service("json").with("stage", stage))
}
