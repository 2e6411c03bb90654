//! Log subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber, writing human-readable events to stderr.
///
/// `RUST_LOG` wins when set; otherwise the sinistro crates log at `info`, or
/// `debug` when `verbose` is set.
pub(crate) fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,sinistro={level},sinistro_data={level},sinistro_clean={level},sinistro_features={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
