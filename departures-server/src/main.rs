use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use departures_server::schedule::{CacheConfig, CachedScheduleStore, SqliteScheduleStore};
use departures_server::search::SearchConfig;
use departures_server::web::{AppState, create_router};

#[derive(Parser)]
#[command(name = "departures-server")]
#[command(about = "Closest public transport departures heading towards a destination")]
struct Args {
    /// SQLite database written by `import`
    #[arg(long, env = "TRANSIT_DATABASE", default_value = "transport.db")]
    database: PathBuf,

    /// Address to listen on
    #[arg(long, env = "TRANSIT_BIND", default_value = "127.0.0.1:5001")]
    bind: SocketAddr,

    /// The city this deployment serves
    #[arg(long, env = "TRANSIT_CITY", default_value = "wroclaw")]
    city: String,

    /// Search radius around the start point, in meters
    #[arg(long, default_value_t = 1000.0)]
    radius: f64,

    /// Number of departures returned when the request has no limit
    #[arg(long, default_value_t = 5)]
    default_limit: usize,

    /// Size of the read-only connection pool
    #[arg(long, default_value_t = 8)]
    max_connections: u32,

    /// How long the stop list stays cached
    #[arg(long, default_value_t = 3600)]
    stops_cache_ttl_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let search_config = SearchConfig::new(args.radius, args.default_limit);
    search_config.validate()?;

    let store = SqliteScheduleStore::open(&args.database, args.max_connections)
        .await
        .with_context(|| format!("opening {}", args.database.display()))?;

    let cache_config = CacheConfig {
        ttl: Duration::from_secs(args.stops_cache_ttl_secs),
        ..CacheConfig::default()
    };
    let store = CachedScheduleStore::new(store, &cache_config);

    let state = AppState::new(store, search_config, &args.city);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!(
        "serving {} departures on http://{}/public_transport/city/{}/closest_departures",
        args.database.display(),
        args.bind,
        args.city
    );

    axum::serve(listener, app).await?;
    Ok(())
}
