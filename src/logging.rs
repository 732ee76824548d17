//! Tracing setup shared by both binaries

/// Install the global fmt subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `info`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
