use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use departures_server::import::{DEFAULT_BATCH_SIZE, import_gtfs};

#[derive(Parser)]
#[command(name = "import")]
#[command(about = "Load a GTFS feed into the departures database")]
struct Args {
    /// Directory holding stops.txt, trips.txt and stop_times.txt
    #[arg(long, env = "TRANSIT_GTFS_DIR")]
    gtfs_dir: PathBuf,

    /// SQLite database to (re)create tables in
    #[arg(long, env = "TRANSIT_DATABASE", default_value = "transport.db")]
    database: PathBuf,

    /// Rows per INSERT statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if !args.gtfs_dir.is_dir() {
        anyhow::bail!("{} is not a directory", args.gtfs_dir.display());
    }

    let summary = import_gtfs(&args.gtfs_dir, &args.database, args.batch_size).await?;

    for (table, rows) in &summary.tables {
        info!("{table}: {rows} rows");
    }
    for file in &summary.skipped {
        info!("{file}: not present");
    }
    info!(
        "imported {} rows into {}",
        summary.total_rows(),
        args.database.display()
    );
    Ok(())
}
