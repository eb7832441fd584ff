//! Print the metric datasets behind an app's regression insights.

use std::io;

use connect_reports::cli::{self, MetricsArgs};
use connect_reports::{ConnectConfig, MetricsPipeline, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    cli::init_logging();
    let args: MetricsArgs = cli::parse_args();

    if let Err(err) = run(args).await {
        cli::exit_with(err);
    }
}

async fn run(args: MetricsArgs) -> Result<()> {
    let config = ConnectConfig::from_env()?;
    let pipeline = MetricsPipeline::from_config(config)?;
    pipeline.run(&args.app_id, &mut io::stdout()).await
}
