use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::error;

use pg_schema_clean::error::Result;
use pg_schema_clean::{logging, write_plans};

/// Prints the statements that would clean each schema captured in a
/// directory of catalog snapshots. Nothing is executed.
#[derive(Parser)]
#[clap(version)]
struct Cli {
    /// Directory searched recursively for `*.json` snapshots
    #[clap(short, long, parse(from_os_str), default_value = "catalog/", env = "PG_SCHEMA_CLEAN_PATH")]
    path: PathBuf,

    /// Only plan these schemas (repeatable)
    #[clap(short, long)]
    schema: Vec<String>,

    /// Leave objects whose name matches this regex in place
    #[clap(short, long)]
    retain: Option<String>,

    /// Log level, overridden by RUST_LOG
    #[clap(long, default_value = "warn", env = "PG_SCHEMA_CLEAN_LOG")]
    log: String,
}

fn main() {
    let args: Cli = Cli::parse();
    logging::init(&args.log);

    if !args.path.exists() {
        error!(path = %args.path.display(), "path does not exist");
        std::process::exit(1);
    }

    if let Err(err) = run(args) {
        error!(%err, "planning failed");
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plans(&args.path, &args.schema, args.retain.as_deref(), &mut out)
}
