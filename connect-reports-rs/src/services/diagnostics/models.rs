//! Diagnostics API data models
//!
//! Type definitions for the diagnostic signatures and diagnostic logs
//! responses. Only the fields the report reads are modelled; everything
//! else in the payload is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /builds/{id}/diagnosticSignatures`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignaturesResponse {
    /// Signatures in API order; `null` or absent reads as empty
    #[serde(default)]
    pub data: Option<Vec<DiagnosticSignature>>,
}

/// A category of runtime fault observed for a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticSignature {
    pub id: String,

    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,

    #[serde(default)]
    pub attributes: Option<SignatureAttributes>,

    pub relationships: SignatureRelationships,
}

impl DiagnosticSignature {
    /// Link to the signature's log collection
    pub fn logs_link(&self) -> &str {
        &self.relationships.logs.links.related
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureAttributes {
    #[serde(default)]
    pub diagnostic_type: Option<String>,

    #[serde(default)]
    pub signature: Option<String>,

    #[serde(default)]
    pub weight: Option<f64>,

    /// Trend insight attached by the API; kept as raw JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRelationships {
    pub logs: Relationship,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub links: RelationshipLinks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipLinks {
    pub related: String,
}

/// Diagnostic logs for one signature
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    #[serde(default)]
    pub product_data: Vec<ProductData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    #[serde(default)]
    pub signature_id: Option<String>,

    /// Undecoded log entries; each becomes a `DiagnosticLog` right before it is rendered
    #[serde(default)]
    pub diagnostic_logs: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticLog {
    pub diagnostic_meta_data: DiagnosticMetaData,

    pub call_stack_tree: Vec<CallStackTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticMetaData {
    pub device_type: String,

    pub os_version: String,

    pub app_version: String,

    pub event_detail: String,

    #[serde(default)]
    pub build_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStackTree {
    pub call_stack_per_thread: bool,

    #[serde(default)]
    pub call_stacks: Vec<CallStack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStack {
    #[serde(default)]
    pub call_stack_root_frames: Vec<Frame>,
}

/// One frame of a callstack; parents own their children
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub raw_frame: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_frames: Option<Vec<Frame>>,
}

impl Frame {
    /// Children of this frame; empty when the payload has no `subFrames`
    pub fn children(&self) -> &[Frame] {
        self.sub_frames.as_deref().unwrap_or(&[])
    }
}
