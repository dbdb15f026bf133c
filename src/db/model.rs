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

//! Database row mapping for domain models.
//!
//! This module provides the conversion logic between raw SQLite result rows
//! and high-level domain models, ensuring type-safe extraction of model
//! attributes from database queries.

use rusqlite::{
    Result, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::model::{PlaylistItem, SourceKind};

impl PlaylistItem {
    /// Maps an SQLite row to a [`PlaylistItem`] instance.
    ///
    /// Expects the columns `id, title, source_kind, source_ref` in that
    /// order.
    ///
    /// # Errors
    ///
    /// Returns a [`rusqlite::Error`] if:
    /// * The row does not contain enough columns.
    /// * The data in a column cannot be converted to the required Rust type.
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            source_kind: row.get(2)?,
            source_ref: row.get(3)?,
        })
    }
}

impl ToSql for SourceKind {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SourceKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "push" => Ok(SourceKind::Push),
            "timed" => Ok(SourceKind::Timed),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
