//! Pretty-print the callstacks behind a build's top disk-writes signature.

use std::io;

use connect_reports::cli::{self, DiagnosticsArgs};
use connect_reports::{ConnectConfig, DiagnosticsPipeline, PacingMode, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    cli::init_logging();
    let args: DiagnosticsArgs = cli::parse_args();

    if let Err(err) = run(args).await {
        cli::exit_with(err);
    }
}

async fn run(args: DiagnosticsArgs) -> Result<()> {
    let mut config = ConnectConfig::from_env()?;
    if args.no_pause {
        config.pacing = PacingMode::None;
    }

    let pipeline = DiagnosticsPipeline::from_config(config)?;
    pipeline.run(&args.build_id, &mut io::stdout()).await
}
