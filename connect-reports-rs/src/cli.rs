//! Command line plumbing shared by the binaries
//!
//! Argument parsers for the three tools, logging setup and the fail-fast
//! exit path. Usage errors exit with `-1`; every other failure exits with
//! `ServiceError::exit_code`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use log::debug;

use crate::error::{ServiceError, EXIT_USAGE};
use crate::ui::red;

/// `generate-token`
#[derive(Debug, Parser)]
#[command(
    name = "generate-token",
    version,
    about = "Print a signed App Store Connect API token.",
    allow_negative_numbers = true
)]
pub struct TokenArgs {
    /// Issuer ID from the API Keys page
    pub issuer_id: String,

    /// Private key ID
    pub key_id: String,

    /// Path to the .p8 private key
    pub private_key_path: PathBuf,

    /// Token lifetime, clamped into [5, 20]
    pub expire_minutes: Option<i64>,
}

/// `get-diagnostics-logs`
#[derive(Debug, Parser)]
#[command(
    name = "get-diagnostics-logs",
    version,
    about = "Pretty-print the callstacks behind a build's top disk-writes signature."
)]
pub struct DiagnosticsArgs {
    /// Build resource ID
    pub build_id: String,

    /// Render every log without waiting for Enter
    #[arg(long, default_value_t = false)]
    pub no_pause: bool,
}

/// `get-metrics-insights`
#[derive(Debug, Parser)]
#[command(
    name = "get-metrics-insights",
    version,
    about = "Print the metric datasets behind an app's regression insights."
)]
pub struct MetricsArgs {
    /// App resource ID
    pub app_id: String,
}

/// Load `.env` and start the logger; `RUST_LOG` overrides the `warn` default
pub fn init_logging() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Parse process arguments, exiting with the usage code on any mistake
pub fn parse_args<T: Parser>() -> T {
    match try_parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => exit_usage(err),
    }
}

pub fn try_parse_args<T, I, A>(args: I) -> Result<T, clap::Error>
where
    T: Parser,
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    T::try_parse_from(args)
}

fn exit_usage(err: clap::Error) -> ! {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => {
            eprintln!("{}", red(err.render()));
            process::exit(EXIT_USAGE)
        }
    }
}

/// Print the error in red to stderr and exit with its code
pub fn exit_with(err: ServiceError) -> ! {
    debug!("{:?}", err);
    eprintln!("{}", failure_message(&err));
    process::exit(err.exit_code())
}

/// The one line block printed for a failure: the error's display form in red
pub fn failure_message(err: &ServiceError) -> String {
    red(err)
}
