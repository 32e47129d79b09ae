mod api;
mod auth;
mod cli;
mod config;
mod dashboard;
mod preview;
mod routes;
mod session;
mod theme;
mod util;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Quiet by default; RUST_LOG opens up transport-level diagnostics.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run().await {
        eprintln!("{} {e:#}", console::style("✖").red().bold());
        std::process::exit(1);
    }
}
