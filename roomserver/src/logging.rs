//! Tracing setup for the gateway process.
//!
//! A live log viewer (SSE-streamed to a browser) is an outer surface this
//! gateway doesn't expose, so this keeps only the underlying
//! `tracing_subscriber` registry such a layer would sit on.

pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
