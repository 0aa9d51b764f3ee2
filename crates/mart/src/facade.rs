// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Read-only query façade over the dimensional mart
//!
//! Each call opens its own read-only connection, runs one catalogue query
//! and releases the connection before returning, so no lock on the database
//! file outlives a call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use diagnostics::*;
use duckdb::{AccessMode, Config, Connection, params_from_iter};

use crate::config::WarehouseConfig;
use crate::error::{Error, Result};
use crate::ident::Ident;
use crate::query::{ColumnRef, MartQuery, MartTable, MartTables, QueryResult};

/// Open an existing database file without write access
pub(crate) fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(Error::connection_unavailable(
            path,
            "database file does not exist",
        ));
    }
    let config = Config::default()
        .access_mode(AccessMode::ReadOnly)
        .map_err(|e| Error::connection_unavailable(path, e))?;
    Connection::open_with_flags(path, config).map_err(|e| Error::connection_unavailable(path, e))
}

/// Entry point for every analytical query
#[derive(Clone, Debug)]
pub struct Facade {
    db_path: PathBuf,
    schema: Ident,
}

impl Facade {
    /// Façade over `db_path`, reading tables of `schema`.
    ///
    /// Fails when the database file does not exist; nothing is created.
    pub fn new<P: AsRef<Path>>(db_path: P, schema: Ident) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if !db_path.is_file() {
            return Err(Error::connection_unavailable(
                &db_path,
                "database file does not exist",
            ));
        }
        Ok(Self { db_path, schema })
    }

    /// Façade over the configured database and mart schema
    pub fn open(config: &WarehouseConfig) -> Result<Self> {
        Self::new(config.db_path(), config.mart_schema.clone())
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    #[must_use]
    pub fn schema(&self) -> &Ident {
        &self.schema
    }

    /// Run one catalogue query and materialize its rows
    pub fn run<Q: MartQuery>(&self, query: &Q) -> Result<QueryResult<Q::Row>> {
        let name = query.name();
        let tables = MartTables::new(&self.schema)?;
        let sql = query.sql(&tables)?;

        let conn = open_read_only(&self.db_path)?;
        self.check_columns(&conn, &query.required_columns())?;

        debug!("Running {query_name}: {sql}", query_name: name, sql: sql);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::from_query_failure(name, e))?;
        let rows = stmt
            .query_map(params_from_iter(query.params()), |row| query.read_row(row))
            .map_err(|e| Error::from_query_failure(name, e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::from_query_failure(name, e))?;

        info!(
            "Query {query_name} returned {count} rows",
            query_name: name,
            count: rows.len()
        );
        Ok(QueryResult {
            query: name,
            columns: query.columns(),
            rows,
        })
    }

    /// Fail with `TableNotFound` / `ColumnNotFound` unless every column exists
    fn check_columns(&self, conn: &Connection, required: &[ColumnRef]) -> Result<()> {
        let mut known: HashMap<MartTable, Vec<String>> = HashMap::new();
        for column in required {
            let table = column.table.name();
            if !known.contains_key(&column.table) {
                known.insert(column.table, self.table_columns(conn, table)?);
            }
            let names = &known[&column.table];
            if names.is_empty() {
                warn!("Mart table {table} is missing", table: table);
                return Err(Error::TableNotFound {
                    table: table.to_string(),
                });
            }
            if !names.iter().any(|n| n == column.column) {
                warn!(
                    "Mart table {table} has no column {missing}",
                    table: table,
                    missing: column.column
                );
                return Err(Error::column_not_found(table, column.column));
            }
        }
        Ok(())
    }

    fn table_columns(&self, conn: &Connection, table: &str) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ?",
        )?;
        let names = stmt
            .query_map([self.schema.as_str(), table], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_database_is_connection_unavailable() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("absent.duckdb");
        let err = Facade::new(&path, Ident::new("dwh_datamart").expect("ident"));
        match err {
            Err(Error::ConnectionUnavailable { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(!path.exists());
    }
}
