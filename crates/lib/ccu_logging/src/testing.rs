use crate::config::{DEFAULT_DIRECTIVES, LOG_FILTER_VAR};
use tracing_subscriber::EnvFilter;

/// subscriber writing into the test output, safe to call from every test.
pub fn init() {
    let filter = std::env::var(LOG_FILTER_VAR).unwrap_or_else(|_| DEFAULT_DIRECTIVES.into());

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
