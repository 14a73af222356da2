//! Diagnostic logging setup

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// `RUST_LOG` takes precedence; otherwise only warnings are shown, or debug
/// events when `verbose` is set.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "iac_tagger=debug"
    } else {
        "iac_tagger=warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed (e.g. when embedded); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
