use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Output goes to stderr so CLI payloads on stdout stay clean.
/// A second call is a no-op.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
