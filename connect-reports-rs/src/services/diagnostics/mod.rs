//! Diagnostics report pipeline
//!
//! Fetches the top diagnostic signature for a build, pulls its logs and
//! pretty-prints the callstack tree of each log:
//!
//! 1. issue a bearer token
//! 2. `GET /builds/{id}/diagnosticSignatures`, keep the first signature
//! 3. follow the signature's `logs` link with `limit` appended
//! 4. for each log, wait on the pacer, then decode and render metadata and frames
//!
//! Logs are decoded one at a time, so a malformed log fails the report only
//! after every log before it has been printed.

mod models;
pub use models::*;

use std::io::Write;

use log::{debug, info};

use crate::config::ConnectConfig;
use crate::core::{HttpGateway, GatewayBuilder, RequestExecutor};
use crate::error::{Result, ServiceError};
use crate::pacing::{pacer_for, Pacer};
use crate::services::common::{auth_headers, decode, decode_value, fetch, XCODE_METRICS_MEDIA_TYPE};
use crate::token::{TokenIssuer, TokenLifetime};
use crate::ui::{blue, red, separator};
use crate::util::with_query_pair;

/// Prompt shown before each log is rendered
pub const CONTINUE_PROMPT: &str = "\nPress Enter to pretty-print callstack.\n";

/// Diagnostics report pipeline
pub struct DiagnosticsPipeline<E, P> {
    config: ConnectConfig,
    issuer: TokenIssuer,
    executor: E,
    pacer: P,
}

impl DiagnosticsPipeline<HttpGateway, Box<dyn Pacer>> {
    /// Pipeline over HTTPS with the configured pacing
    pub fn from_config(config: ConnectConfig) -> Result<Self> {
        let executor = GatewayBuilder::from_config(&config).build();
        let pacer = pacer_for(&config.pacing);
        Self::new(config, executor, pacer)
    }
}

impl<E: RequestExecutor, P: Pacer> DiagnosticsPipeline<E, P> {
    /// Create a pipeline, loading the private key named by the config
    pub fn new(config: ConnectConfig, executor: E, pacer: P) -> Result<Self> {
        let issuer = TokenIssuer::from_key_file(
            config.issuer_id.clone(),
            config.key_id.clone(),
            &config.private_key_path,
        )?;
        Ok(Self::with_issuer(config, issuer, executor, pacer))
    }

    /// Create a pipeline with an already loaded token issuer
    pub fn with_issuer(config: ConnectConfig, issuer: TokenIssuer, executor: E, pacer: P) -> Self {
        Self {
            config,
            issuer,
            executor,
            pacer,
        }
    }

    /// Run the whole report for `build_id`, writing to `out`
    pub async fn run<W: Write + Send>(&self, build_id: &str, out: &mut W) -> Result<()> {
        let bearer = self.issuer.issue(TokenLifetime::fixed())?.bearer();

        writeln!(out, "\nGet top disk writes diagnostic signature and related logs.\n")?;

        let signature = self.top_signature(&bearer, build_id, out).await?;
        let product_data = self.signature_logs(&bearer, &signature, out).await?;

        let logs = &product_data.diagnostic_logs;
        writeln!(out, "\nGot {} logs to parse", logs.len())?;
        info!("Rendering {} diagnostic logs for build {}", logs.len(), build_id);

        for entry in logs {
            out.flush()?;
            self.pacer.pause(CONTINUE_PROMPT).await?;
            let log: DiagnosticLog = decode_value(entry, "diagnostic log")?;
            for line in render_log(&log) {
                writeln!(out, "{}", line)?;
            }
        }
        out.flush()?;

        Ok(())
    }

    /// Fetch the build's signatures and select the first one
    pub async fn top_signature<W: Write + Send>(
        &self,
        bearer: &str,
        build_id: &str,
        out: &mut W,
    ) -> Result<DiagnosticSignature> {
        let url = format!("{}/builds/{}/diagnosticSignatures", self.config.base_url, build_id);
        let body = fetch(&self.executor, out, &url, auth_headers(bearer, None)).await?;
        let response: SignaturesResponse = decode(&body, "diagnostic signatures response")?;

        let signature = response
            .data
            .and_then(|data| data.into_iter().next())
            .ok_or_else(|| {
                ServiceError::not_found(format!("no signature was found with build id {}", build_id))
            })?;

        debug!("Selected diagnostic signature {}", signature.id);
        if let Some(attributes) = &signature.attributes {
            writeln!(
                out,
                "Top signature: {} ({}, weight {})",
                blue(attributes.signature.as_deref().unwrap_or(&signature.id)),
                attributes.diagnostic_type.as_deref().unwrap_or("unknown type"),
                attributes.weight.map(|w| w.to_string()).unwrap_or_else(|| "n/a".to_string()),
            )?;
        }

        Ok(signature)
    }

    /// Fetch the logs behind a signature's relationship link
    pub async fn signature_logs<W: Write + Send>(
        &self,
        bearer: &str,
        signature: &DiagnosticSignature,
        out: &mut W,
    ) -> Result<ProductData> {
        let url = with_query_pair(signature.logs_link(), "limit", &self.config.log_limit.to_string())?;
        let body = fetch(
            &self.executor,
            out,
            &url,
            auth_headers(bearer, Some(XCODE_METRICS_MEDIA_TYPE)),
        )
        .await?;
        let response: LogsResponse = decode(&body, "diagnostic logs response")?;

        let product_data = response
            .product_data
            .into_iter()
            .next()
            .filter(|data| data.signature_id.is_some())
            .ok_or_else(|| ServiceError::not_found("empty diagnostic logs response was returned"))?;

        if product_data.diagnostic_logs.is_empty() {
            return Err(ServiceError::not_found(format!(
                "no diagnostic log was found for signature id {}",
                product_data.signature_id.as_deref().unwrap_or_default()
            )));
        }

        Ok(product_data)
    }
}

/// Render one log: metadata, event detail, per-thread flag, separator, frames.
///
/// Only the first callstack tree is rendered; it is the one carrying the
/// per-thread flag printed in the header.
pub fn render_log(log: &DiagnosticLog) -> Vec<String> {
    let metadata = &log.diagnostic_meta_data;
    let mut lines = vec![
        red(format!(
            "Metadata: {} ({}), {}",
            metadata.device_type, metadata.os_version, metadata.app_version
        )),
        blue(format!("Detail: {}", metadata.event_detail)),
    ];

    if let Some(tree) = log.call_stack_tree.first() {
        lines.push(format!("callStackPerThread:  {}", tree.call_stack_per_thread));
        lines.push(separator());
        for callstack in &tree.call_stacks {
            lines.extend(render_frames(&callstack.call_stack_root_frames));
        }
    } else {
        lines.push(separator());
    }

    lines
}

/// Pre-order rendering of a frame forest, two spaces of indent per depth
pub fn render_frames(roots: &[Frame]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack: Vec<(&Frame, usize)> = roots.iter().rev().map(|frame| (frame, 0)).collect();

    while let Some((frame, depth)) = stack.pop() {
        lines.push(format!("{}{}", " ".repeat(2 * depth), frame.raw_frame));
        stack.extend(frame.children().iter().rev().map(|child| (child, depth + 1)));
    }

    lines
}
