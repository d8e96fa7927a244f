use anyhow::Result;
use clap::Parser;
use tracing::error;

use asnrank::{rank, report, utils, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    match rank::rank_asns(&args) {
        Ok(result) => {
            report::print_ranking(&result);
            Ok(())
        }
        Err(e) => {
            error!(action = "abort", component = "main", error = %e, "Ranking failed");
            std::process::exit(1);
        }
    }
}
