//! Power and performance metrics data models
//!
//! Type definitions for the `perfPowerMetrics` response: the nested metric
//! report (categories, metrics, datasets, points) and the regression
//! insights computed over it.
//!
//! The envelope keeps each metric as raw JSON. A metric is decoded into
//! `Metric` only once a regression insight points at it, and a dataset only
//! once it matches a population, so unrelated entries never fail the report.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// `GET /apps/{id}/perfPowerMetrics`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfPowerMetricsResponse {
    #[serde(default)]
    pub product_data: Vec<MetricReport>,

    #[serde(default)]
    pub insights: Option<Insights>,
}

/// Metrics for one platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReport {
    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub metric_categories: Vec<MetricCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCategory {
    #[serde(default)]
    pub identifier: Option<String>,

    /// Undecoded metric entries
    #[serde(default)]
    pub metrics: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub identifier: String,

    pub unit: MetricUnit,

    /// Undecoded dataset entries
    #[serde(default)]
    pub datasets: Vec<Value>,
}

impl Metric {
    /// Identifier of an undecoded metric entry
    pub fn identifier_of(entry: &Value) -> Option<&str> {
        entry.get("identifier").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricUnit {
    #[serde(default)]
    pub identifier: Option<String>,

    pub display_name: String,
}

/// One time series, selected by device and percentile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDataset {
    pub filter_criteria: FilterCriteria,

    #[serde(default)]
    pub points: Vec<MetricPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub device: String,

    pub device_marketing_name: String,

    pub percentile: String,
}

impl MetricDataset {
    /// Whether an undecoded dataset entry belongs to the given population.
    ///
    /// Only `filterCriteria.device` and `filterCriteria.percentile` are read;
    /// an entry without them matches nothing.
    pub fn entry_matches(entry: &Value, population: &Population) -> bool {
        let criteria = entry.get("filterCriteria");
        let field = |name: &str| criteria.and_then(|c| c.get(name)).and_then(Value::as_str);
        field("device") == Some(population.device.as_str())
            && field("percentile") == Some(population.percentile.as_str())
    }
}

/// One app version's value; numbers keep their JSON text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    pub version: String,

    pub value: Number,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_margin: Option<Number>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    #[serde(default)]
    pub regressions: Option<Vec<RegressionInsight>>,
}

/// A metric that worsened for some device/percentile populations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionInsight {
    pub metric: String,

    #[serde(default)]
    pub metric_category: Option<String>,

    pub summary_string: String,

    #[serde(default)]
    pub populations: Vec<Population>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Population {
    pub device: String,

    pub percentile: String,
}
