//! # Connect Reports
//!
//! Retrieves diagnostics and performance-metrics reports from the App Store
//! Connect API and renders them as console text.
//!
//! This crate provides:
//!
//! - Signed, short-lived bearer tokens (`token`)
//! - A fail-fast HTTPS request gateway with uniform error reports (`core`, `error`)
//! - The diagnostics callstack report and the metrics regression report (`services`)
//! - Configuration loading, pacing between logs and console rendering helpers
//!
//! ## Architecture
//!
//! A pipeline issues a token with `TokenIssuer`, drives one or more calls
//! through a `RequestExecutor`, then turns the decoded response into text:
//!
//! - `DiagnosticsPipeline`: signatures for a build, then the top signature's logs
//! - `MetricsPipeline`: regression insights correlated with metric datasets

pub mod core;
pub use crate::core::{GatewayBuilder, HttpGateway, RequestExecutor};

pub mod services;
pub use services::{DiagnosticsPipeline, MetricsPipeline};

pub mod error;
pub use error::{ErrorContext, Result, ServiceError};

pub mod config;
pub use config::{ConfigProvider, ConnectConfig, PacingMode, ServiceConfig};

pub mod token;
pub use token::{SignedAssertion, TokenIssuer, TokenLifetime};

pub mod pacing;
pub use pacing::{DelayPacer, NoPacer, Pacer, StdinPacer};

pub mod ui;

pub mod cli;

mod util;

#[cfg(test)]
mod tests;
