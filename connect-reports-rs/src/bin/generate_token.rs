//! Print a signed App Store Connect API token to stdout.

use connect_reports::cli::{self, TokenArgs};
use connect_reports::{TokenIssuer, TokenLifetime};
use log::info;

fn main() {
    cli::init_logging();
    let args: TokenArgs = cli::parse_args();

    let lifetime = TokenLifetime::clamped(args.expire_minutes);
    let assertion = TokenIssuer::from_key_file(args.issuer_id, args.key_id, &args.private_key_path)
        .and_then(|issuer| issuer.issue(lifetime))
        .unwrap_or_else(|err| cli::exit_with(err));

    info!("Issued token valid for {} minutes", lifetime.minutes());
    println!("{}", assertion.token);
}
