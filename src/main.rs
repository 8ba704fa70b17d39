//! brainbase - question base for quiz games.
//!
//! Serves random questions, random tournament packages and full-text search
//! over a growing question table.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if brainbase::cli::is_verbose() {
        "brainbase=info"
    } else {
        "brainbase=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    brainbase::cli::run().await
}
