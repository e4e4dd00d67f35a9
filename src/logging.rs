use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "book_analyzer=info";

/// Installs the global tracing subscriber.
///
/// Events go to stderr so stdout carries only the rendered report.
/// `RUST_LOG` overrides the default `book_analyzer=info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
