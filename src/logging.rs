use tracing_subscriber::EnvFilter;

/// Initialize tracing for the command line
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or
/// everything from this crate down to `debug` with `--verbose`.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "viewbind_migrate=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
