pub mod migrations;
pub mod queries;

use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;

/// Opens `path` (or `:memory:`) and applies the migrations shipped with the crate.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    init_db_with(path, Path::new(migrations::DEFAULT_DIR))
}

pub fn init_db_with(path: &str, migrations_dir: &Path) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {path}"))?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn, migrations_dir)?;

    Ok(conn)
}
