//! ASIT Daily - dose schedule and adherence journal for allergen immunotherapy

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asit_daily=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting ASIT Daily v{}", env!("CARGO_PKG_VERSION"));

    // Run CLI
    asit_daily::cli::run()?;

    Ok(())
}
