//! arbor REST API entry point.
//!
//! Binary name: `arbor`
//!
//! Parses CLI arguments, initializes the database and services, then serves
//! the REST API.

mod http;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "arbor", about = "Branching-conversation chat backend", version)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "ARBOR_PORT")]
    port: u16,

    /// SQLite database URL; defaults to ~/.arbor/arbor.db.
    #[arg(long, env = "ARBOR_DATABASE_URL")]
    database_url: Option<String>,

    /// Base URL of the OpenAI-compatible completion endpoint.
    #[arg(
        long,
        env = "ARBOR_COMPLETIONS_URL",
        default_value = "https://ai.hackclub.com"
    )]
    completions_url: String,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "info",
        1 => "info,arbor=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let state = AppState::init(args.database_url.as_deref(), &args.completions_url).await?;
    let router = http::router::build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "arbor API listening");
    axum::serve(listener, router).await?;

    Ok(())
}
