// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Data access layer.
//!
//! This module stores each owner's playlist items in SQLite. The playback
//! orchestrator never calls it; the host reads an owner's list once and hands
//! it over as a ready-made playlist.
//!
//! # Tables
//!
//! * `playlist_items` - One row per item, keyed by owner, with its creation
//!   time in milliseconds since the epoch.
//!
//! # Performance
//!
//! Every function in this module uses [`rusqlite::Connection::prepare_cached`]
//! to reduce SQL parsing overhead.

mod model;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::model::{PlaylistItem, SourceKind};

const ITEM_COLUMNS: &str = "id, title, source_kind, source_ref";

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("no playlist item with id {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Fields for a new playlist item.
#[derive(Debug, Clone)]
pub(crate) struct NewItem {
    pub(crate) title: String,
    pub(crate) source_kind: SourceKind,
    pub(crate) source_ref: String,
}

/// Fields to change on an existing item, `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub(crate) struct ItemChanges {
    pub(crate) title: Option<String>,
    pub(crate) source_kind: Option<SourceKind>,
    pub(crate) source_ref: Option<String>,
}

/// Opens a connection to the SQLite database and configures performance settings.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging for better concurrency.
/// * **Performance Tuning**: Sets synchronous mode to `NORMAL`.
/// * **Schema**: Executes [`create_schema`] to ensure all tables and indices exist.
///
/// # Arguments
///
/// * `path` - The file system path to the SQLite database file.
///
/// # Errors
///
/// Returns an error if:
/// * The database file cannot be opened.
/// * The initial PRAGMA configurations fail.
/// * The schema initialization fails.
pub(crate) fn init_db(path: &str) -> Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("Failed to open database {}", path))?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        anyhow::bail!(
            "Failed to switch to WAL mode. Current mode: {}",
            journal_mode
        );
    }

    conn.execute_batch("PRAGMA synchronous = NORMAL;")?;

    conn.set_prepared_statement_cache_capacity(16);

    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// The index on `(owner_id, created_at)` serves the newest-first listing.
///
/// # Errors
///
/// Returns an error if the transaction fails, if there are permission issues
/// with the database file, or if the SQL syntax is invalid.
pub(crate) fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS playlist_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            source_kind TEXT NOT NULL CHECK (source_kind IN ('push', 'timed')),
            source_ref TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_playlist_items_owner
            ON playlist_items (owner_id, created_at);

        COMMIT;",
    )
    .context("Failed to create schema")
}

/// Fetches an owner's playlist, newest item first.
///
/// Items created within the same millisecond keep their insertion order
/// reversed, by id.
///
/// # Errors
///
/// Returns an error if the SQL query fails or a row holds an unknown source
/// kind.
pub(crate) fn list(conn: &Connection, owner_id: &str) -> Result<Vec<PlaylistItem>, StoreError> {
    let sql = format!(
        "SELECT {} FROM playlist_items WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        ITEM_COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![owner_id], PlaylistItem::from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }

    Ok(results)
}

/// Adds an item to an owner's playlist.
pub(crate) fn create(conn: &Connection, owner_id: &str, item: &NewItem) -> Result<PlaylistItem, StoreError> {
    let sql = "
        INSERT INTO playlist_items (owner_id, title, source_kind, source_ref, created_at)
        VALUES (?, ?, ?, ?, CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))";

    let mut stmt = conn.prepare_cached(sql)?;
    stmt.execute(params![owner_id, item.title, item.source_kind, item.source_ref])?;

    fetch(conn, owner_id, conn.last_insert_rowid())
}

/// Applies `changes` to one of the owner's items.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if the owner has no such item.
pub(crate) fn update(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    changes: &ItemChanges,
) -> Result<PlaylistItem, StoreError> {
    let sql = "
        UPDATE playlist_items
        SET title = COALESCE(?, title),
            source_kind = COALESCE(?, source_kind),
            source_ref = COALESCE(?, source_ref)
        WHERE id = ? AND owner_id = ?";

    let mut stmt = conn.prepare_cached(sql)?;
    let updated = stmt.execute(params![changes.title, changes.source_kind, changes.source_ref, id, owner_id])?;
    if updated == 0 {
        return Err(StoreError::NotFound(id));
    }

    fetch(conn, owner_id, id)
}

/// Removes one of the owner's items.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if the owner has no such item.
pub(crate) fn delete(conn: &Connection, owner_id: &str, id: i64) -> Result<(), StoreError> {
    let mut stmt = conn.prepare_cached("DELETE FROM playlist_items WHERE id = ? AND owner_id = ?")?;
    if stmt.execute(params![id, owner_id])? == 0 {
        return Err(StoreError::NotFound(id));
    }

    Ok(())
}

fn fetch(conn: &Connection, owner_id: &str, id: i64) -> Result<PlaylistItem, StoreError> {
    let sql = format!("SELECT {} FROM playlist_items WHERE id = ? AND owner_id = ?", ITEM_COLUMNS);
    let mut stmt = conn.prepare_cached(&sql)?;

    stmt.query_row(params![id, owner_id], PlaylistItem::from_row)
        .optional()?
        .ok_or(StoreError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn
    }

    fn new_item(title: &str, kind: SourceKind) -> NewItem {
        NewItem {
            title: title.to_string(),
            source_kind: kind,
            source_ref: format!("https://example.com/{}", title),
        }
    }

    #[test]
    fn test_list_is_newest_first_per_owner() {
        let conn = memory_db();
        let first = create(&conn, "ann", &new_item("first", SourceKind::Push)).unwrap();
        let second = create(&conn, "ann", &new_item("second", SourceKind::Timed)).unwrap();
        create(&conn, "bob", &new_item("other", SourceKind::Push)).unwrap();

        let items = list(&conn, "ann").unwrap();

        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(items[0].source_kind, SourceKind::Timed);
        assert!(list(&conn, "carol").unwrap().is_empty());
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let conn = memory_db();
        let item = create(&conn, "ann", &new_item("deck", SourceKind::Timed)).unwrap();

        let changes = ItemChanges {
            title: Some("quarterly deck".to_string()),
            ..ItemChanges::default()
        };
        let updated = update(&conn, "ann", item.id, &changes).unwrap();

        assert_eq!(updated.title, "quarterly deck");
        assert_eq!(updated.source_kind, SourceKind::Timed);
        assert_eq!(updated.source_ref, item.source_ref);
    }

    #[test]
    fn test_other_owners_items_are_not_found() {
        let conn = memory_db();
        let item = create(&conn, "ann", &new_item("talk", SourceKind::Push)).unwrap();

        assert!(matches!(
            update(&conn, "bob", item.id, &ItemChanges::default()),
            Err(StoreError::NotFound(id)) if id == item.id
        ));
        assert!(matches!(delete(&conn, "bob", item.id), Err(StoreError::NotFound(_))));

        delete(&conn, "ann", item.id).unwrap();
        assert!(list(&conn, "ann").unwrap().is_empty());
    }
}
