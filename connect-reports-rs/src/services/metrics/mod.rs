//! Metrics insight pipeline
//!
//! Fetches power and performance metrics for an app and, for every
//! regression insight, prints the datasets of the regressed metric that
//! belong to the insight's populations as aligned tables.

mod models;
pub use models::*;

use std::io::Write;

use log::{debug, info};
use serde_json::{Number, Value};

use crate::config::ConnectConfig;
use crate::core::{GatewayBuilder, HttpGateway, RequestExecutor};
use crate::error::{Result, ServiceError};
use crate::services::common::{auth_headers, decode, decode_value, fetch, XCODE_METRICS_MEDIA_TYPE};
use crate::token::{TokenIssuer, TokenLifetime};
use crate::ui::{blue, green, red, separator, Table};

/// Metrics insight pipeline
pub struct MetricsPipeline<E> {
    config: ConnectConfig,
    issuer: TokenIssuer,
    executor: E,
}

impl MetricsPipeline<HttpGateway> {
    /// Pipeline over HTTPS
    pub fn from_config(config: ConnectConfig) -> Result<Self> {
        let executor = GatewayBuilder::from_config(&config).build();
        Self::new(config, executor)
    }
}

impl<E: RequestExecutor> MetricsPipeline<E> {
    /// Create a pipeline, loading the private key named by the config
    pub fn new(config: ConnectConfig, executor: E) -> Result<Self> {
        let issuer = TokenIssuer::from_key_file(
            config.issuer_id.clone(),
            config.key_id.clone(),
            &config.private_key_path,
        )?;
        Ok(Self::with_issuer(config, issuer, executor))
    }

    /// Create a pipeline with an already loaded token issuer
    pub fn with_issuer(config: ConnectConfig, issuer: TokenIssuer, executor: E) -> Self {
        Self {
            config,
            issuer,
            executor,
        }
    }

    /// Run the whole report for `app_id`, writing to `out`
    pub async fn run<W: Write + Send>(&self, app_id: &str, out: &mut W) -> Result<()> {
        let bearer = self.issuer.issue(TokenLifetime::fixed())?.bearer();

        writeln!(out, "Find egregious metrics datasets.")?;

        let url = format!("{}/apps/{}/perfPowerMetrics", self.config.base_url, app_id);
        let body = fetch(
            &self.executor,
            out,
            &url,
            auth_headers(&bearer, Some(XCODE_METRICS_MEDIA_TYPE)),
        )
        .await?;
        let response: PerfPowerMetricsResponse = decode(&body, "performance metrics response")?;

        let regressions = response
            .insights
            .and_then(|insights| insights.regressions)
            .ok_or_else(|| {
                ServiceError::not_found(format!("no regression insight found with app ID {}", app_id))
            })?;
        info!("{} regression insights for app {}", regressions.len(), app_id);

        for regression in &regressions {
            writeln!(out, "{}", red(format!("\ninsight regression:\n{}", blue(&regression.summary_string))))?;

            let entry = find_metric(&response.product_data, &regression.metric).ok_or_else(|| {
                ServiceError::not_found("no metrics datasets matching the regression insight")
            })?;
            let metric: Metric = decode_value(entry, "metric")?;
            let datasets = correlate_datasets(&metric, &regression.populations)?;
            debug!(
                "Metric {} matched {} datasets for {} populations",
                metric.identifier,
                datasets.len(),
                regression.populations.len()
            );

            writeln!(out, "{}", separator())?;
            for dataset in &datasets {
                writeln!(out, "{}", dataset_header(&metric, dataset))?;
                writeln!(out, "{}", dataset_table(dataset).render())?;
            }
        }
        out.flush()?;

        Ok(())
    }
}

/// Find the metric named `name` across every report and category.
///
/// The scan visits every metric and the last match wins when the same
/// identifier appears more than once. The entry is returned undecoded.
pub fn find_metric<'a>(reports: &'a [MetricReport], name: &str) -> Option<&'a Value> {
    reports
        .iter()
        .flat_map(|report| report.metric_categories.iter())
        .flat_map(|category| category.metrics.iter())
        .filter(|entry| Metric::identifier_of(entry) == Some(name))
        .last()
}

/// Datasets of `metric` matching each population, in population order and
/// then dataset order. Populations without a dataset contribute nothing;
/// a matched dataset that cannot be decoded fails the report.
pub fn correlate_datasets(metric: &Metric, populations: &[Population]) -> Result<Vec<MetricDataset>> {
    populations
        .iter()
        .flat_map(|population| {
            metric
                .datasets
                .iter()
                .filter(move |entry| MetricDataset::entry_matches(entry, population))
        })
        .map(|entry| decode_value(entry, "metric dataset"))
        .collect()
}

/// Colorized title line for one dataset
pub fn dataset_header(metric: &Metric, dataset: &MetricDataset) -> String {
    let criteria = &dataset.filter_criteria;
    green(format!(
        "\n {} ({}), {}, {}",
        metric.identifier, metric.unit.display_name, criteria.device_marketing_name, criteria.percentile
    ))
}

/// Version, value and error margin rows, one column per point
pub fn dataset_table(dataset: &MetricDataset) -> Table {
    let points = &dataset.points;
    Table::new()
        .row("version", points.iter().map(|p| p.version.clone()).collect())
        .row("value", points.iter().map(|p| p.value.to_string()).collect())
        .row(
            "error margin",
            points
                .iter()
                .map(|p| p.error_margin.as_ref().map(Number::to_string).unwrap_or_default())
                .collect(),
        )
}
