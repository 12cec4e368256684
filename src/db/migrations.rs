use std::fs;
use std::path::Path;

use anyhow::Context;
use rusqlite::{params, Connection};

pub const DEFAULT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

#[derive(Debug)]
struct Migration {
    name: String,
    sql: String,
}

fn load_migrations(dir: &Path) -> anyhow::Result<Vec<Migration>> {
    let mut migrations: Vec<Migration> = fs::read_dir(dir)
        .with_context(|| format!("failed to read migrations directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let sql = fs::read_to_string(&path)
                .with_context(|| format!("failed to read migration file: {name}"))?;
            Ok(Migration { name, sql })
        })
        .collect::<anyhow::Result<_>>()?;

    migrations.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(migrations)
}

/// Applies every not-yet-recorded `*.sql` file in `dir`, in file-name order.
/// Returns how many were applied.
pub fn run_migrations(conn: &Connection, dir: &Path) -> anyhow::Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "migrations directory not found, skipping");
        return Ok(0);
    }

    let mut applied = 0;
    for migration in load_migrations(dir)? {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                params![migration.name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(&migration.sql)
            .with_context(|| format!("failed to apply migration: {}", migration.name))?;
        tx.execute(
            "INSERT INTO _migrations (name) VALUES (?1)",
            params![migration.name],
        )
        .with_context(|| format!("failed to record migration: {}", migration.name))?;
        tx.commit()?;

        tracing::info!(name = %migration.name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}
