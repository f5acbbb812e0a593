//! Intervention Council
//!
//! Recommends a behavioral intervention strategy for the user's current state
//! and learns from reported outcomes.

use intervention_council::cli;

fn main() -> anyhow::Result<()> {
    // Initialize logging (WARN level by default, use RUST_LOG=info for detail)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::run()
}
