//! Image proxy.
//!
//! Fetches a remote image named by `?url=`, presenting a browser identity and
//! a same-origin `Referer`, and relays the bytes with long-lived cache headers.
//!
//! ```text
//!     Client                         ┌──────────────────────────────┐
//!     GET /proxy?url=<target> ──────▶│ validate: present, absolute, │
//!                                    │           not this host      │
//!                                    └──────────────┬───────────────┘
//!                                                   │ one GET
//!                                                   ▼
//!                                    ┌──────────────────────────────┐      Origin
//!                                    │ fetch: Referer = origin,     │─────▶ server
//!                                    │        User-Agent = browser  │◀─────
//!                                    └──────────────┬───────────────┘
//!     200 image/* ◀─────────────────────────────────┘
//!     Cache-Control: public, max-age=31536000, immutable
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use image_proxy::config::load_or_default;
use image_proxy::http::HttpServer;
use image_proxy::lifecycle::{wait_for_signal, Shutdown};
use image_proxy::observability::{logging, metrics};
use image_proxy::proxy::{invoke, ImageFetcher, ProxyRequest};

#[derive(Parser)]
#[command(name = "image-proxy")]
#[command(about = "Relay remote images with browser headers and long-lived caching", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// Proxy one URL in-process and print the function response as JSON
    Invoke {
        /// Target URL to fetch
        #[arg(short, long)]
        url: Option<String>,

        /// Host header of the simulated inbound request
        #[arg(long)]
        host: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            logging::init_logging(&config.observability);
            tracing::info!("image-proxy v{} starting", env!("CARGO_PKG_VERSION"));

            tracing::info!(
                bind_address = %config.listener.bind_address,
                route = %config.proxy.route_path,
                request_timeout_secs = config.timeouts.request_secs,
                "Configuration loaded"
            );

            if config.observability.metrics_enabled {
                if let Ok(addr) = config.observability.metrics_address.parse() {
                    metrics::init_metrics(addr);
                } else {
                    tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    );
                }
            }

            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");

            let shutdown = Shutdown::new();
            let server_shutdown = shutdown.subscribe();
            tokio::spawn(async move {
                wait_for_signal().await;
                shutdown.trigger();
            });

            let server = HttpServer::new(config)?;
            server.run(listener, server_shutdown).await?;

            tracing::info!("Shutdown complete");
        }
        Commands::Invoke { url, host } => {
            let fetcher = ImageFetcher::from_config(&config)?;
            let request = ProxyRequest { url, host };
            let response = invoke(&fetcher, &request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
