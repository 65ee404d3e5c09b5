use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Output always goes to stderr since
/// stdout carries MCP frames and `call` results.
pub fn init(default_directives: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn crate_directives() -> String {
    format!("{}=debug", env!("CARGO_CRATE_NAME"))
}
