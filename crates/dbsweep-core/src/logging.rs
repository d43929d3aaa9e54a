use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global JSON subscriber on stderr.
///
/// `RUST_LOG` wins when set. Otherwise quiet mode logs errors only and
/// verbose mode logs at info. Safe to call more than once; later calls are
/// no-ops.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { "error" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
