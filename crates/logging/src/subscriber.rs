//! Console subscriber installation.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides the
/// default console filter.
pub const LOG_ENV: &str = "GOANYSYNC_LOG";

/// Returns the filter directive used when [`LOG_ENV`] is unset.
pub const fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Builds the console filter from [`LOG_ENV`], falling back to
/// [`default_directive`] when the variable is unset or unparsable.
pub fn console_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Installs a compact fmt subscriber writing to standard error.
///
/// Installing twice is harmless; the second call keeps the first subscriber.
pub fn init_tracing(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(console_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
