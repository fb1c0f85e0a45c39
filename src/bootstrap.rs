use tracing_subscriber::EnvFilter;

/// Initialize compact console logging, honoring `RUST_LOG` with an `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Load `.env` if present. Missing files are fine; real environments win.
pub fn init_env() {
    let _ = dotenvy::dotenv();
}
