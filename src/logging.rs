//! Tracing subscriber setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Default filter for a verbosity level (`-q` = -1, `-v` = 1, `-vv` = 2).
pub fn default_directive(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-1 => "wastekit=warn",
        0 => "wastekit=info",
        1 => "wastekit=debug",
        _ => "wastekit=trace",
    }
}

/// Install a stderr subscriber. `RUST_LOG` overrides the verbosity flags.
///
/// Calling this more than once is harmless; only the first call installs.
pub fn init(verbosity: i8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
