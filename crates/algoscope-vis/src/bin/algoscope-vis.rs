//! Algoscope Visualization Server
//!
//! Usage: `algoscope-vis [port] [seed]`. A JSON config file named by
//! `ALGOSCOPE_CONFIG` is read first; arguments override it.

use algoscope_vis::{VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoscope_vis=info,algoscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VisConfig::from_env_and_args(std::env::args().skip(1))?;
    match config.seed {
        Some(seed) => tracing::info!("Random inputs seeded with {}", seed),
        None => tracing::info!("Random inputs unseeded"),
    }

    VisServer::new(config).serve().await?;

    Ok(())
}
