//! URL load tester server.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /test/post          ┌──────────────────────────────────────────────┐
//!     [RequestSpec, ...]       │                 URL TESTER                    │
//!     ─────────────────────────┼─▶ http server ─▶ aggregator (one spec at a    │
//!                              │                  time, input order)          │
//!                              │                      │                       │
//!                              │                      ▼                       │
//!                              │                  probe ──reject──▶ all fail   │
//!                              │                      │                       │
//!                              │                      ▼ accept                │
//!                              │                  executor: batches of C ─────┼──▶ Target
//!                              │                      │                       │
//!     [ResultRecord, ...]      │                      ▼                       │
//!     ◀────────────────────────┼── JSON ◀──────── records                     │
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use url_tester::http::HttpServer;
use url_tester::lifecycle::{signals, startup, Shutdown};
use url_tester::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "url-tester")]
#[command(about = "HTTP load tester with a JSON API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "URL_TESTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = startup::resolve_config(args.config.as_deref(), args.bind.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("url-tester v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        attempt_timeout_secs = config.executor.attempt_timeout_secs,
        probe_timeout_secs = config.executor.probe_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = startup::bind_listener(&config.listener).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    signals::trigger_on_signal(&shutdown).await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
