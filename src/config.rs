use anyhow::{Context, Result};

/// Runtime configuration, sourced from the environment (`.env` supported).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
}

pub fn load() -> Result<Config> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    Ok(Config { database_url })
}
