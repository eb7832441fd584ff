//! Report pipelines
//!
//! One submodule per report, each hard-wired to its endpoints and response shapes.

pub mod diagnostics;
pub mod metrics;
pub mod common;

pub use diagnostics::DiagnosticsPipeline;
pub use metrics::MetricsPipeline;
