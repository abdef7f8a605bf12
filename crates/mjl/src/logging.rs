use tracing_subscriber::EnvFilter;

use crate::args::GlobalArgs;

/// Initialize the tracing subscriber for CLI use.
///
/// Verbosity flags set the default filter; `RUST_LOG` overrides it when
/// present. Log output goes to stderr so diagnostics on stdout stay
/// machine-consumable.
pub fn init(global: &GlobalArgs) {
    let default_level = if global.quiet {
        "error"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
