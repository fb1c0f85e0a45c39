use anyhow::Result;
use comanda::db::{self, Database};
use comanda::{bootstrap, config, menu};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use tracing::{error, info};

/// Migrations embedded into the binary so a fresh database bootstraps itself.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn main() {
    if let Err(err) = run() {
        error!("fatal: {err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = config::load()?;
    let mut database = Database::new(config.database_url);

    info!("Running migrations...");
    let migrations_count = db::run_migrations(database.conn()?, MIGRATIONS)?;
    info!("Ran {} new migrations successfully", migrations_count);

    let result = menu::run(&mut database);
    database.close();
    Ok(result?)
}
