//! SQLite schema initialization for the daemon's persistent store.
//!
//! Every object is guarded with IF NOT EXISTS, so re-running an installation
//! never drops, duplicates, or alters existing rows. No data is read or
//! written beyond schema objects.

use std::fs;
use std::path::Path;

use log::info;
use rusqlite::Connection;

use super::error::InstallerError;
use super::steps::StepOutcome;
use super::target::InstallationTarget;

/// Context, history, conversation, and keybinding tables consumed by the
/// daemon, plus the indexes backing its lookup and ordering queries.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS system_context (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT UNIQUE NOT NULL,
    value TEXT,
    category TEXT,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS command_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    command TEXT NOT NULL,
    output TEXT,
    success BOOLEAN,
    executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS keybindings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    modifiers TEXT,
    key TEXT NOT NULL,
    action TEXT NOT NULL,
    description TEXT
);

CREATE INDEX IF NOT EXISTS idx_context_key ON system_context(key);
CREATE INDEX IF NOT EXISTS idx_history_time ON command_history(executed_at);
CREATE INDEX IF NOT EXISTS idx_conversations_time ON conversations(created_at);
"#;

/// Open (creating if absent) the store and apply the guarded DDL batch.
pub fn initialize(db_path: &Path) -> Result<(), InstallerError> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| InstallerError::System(format!("failed to create {}: {e}", parent.display())))?;
    }

    let conn = Connection::open(db_path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn run(target: &InstallationTarget) -> Result<StepOutcome, InstallerError> {
    initialize(&target.db_path)?;
    info!("persistent store schema ready at {}", target.db_path.display());
    Ok(StepOutcome::Completed)
}
