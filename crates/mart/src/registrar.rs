// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Raw view registration
//!
//! Presents the on-disk CSV and Parquet files as views in the raw schema.
//! Registration is `CREATE OR REPLACE`: running it again swaps the view
//! definition and never touches the files themselves.
//!
//! Before any DDL runs, every pattern must match at least one file, all
//! branches of a union must agree on column count, and the union as a whole
//! must bind. A failed check leaves any previous definition of the view in
//! place.

use diagnostics::*;
use duckdb::Connection;

use crate::config::WarehouseConfig;
use crate::error::{Error, Result};
use crate::facade::open_read_only;
use crate::ident::Ident;
use crate::source::{SourceSpec, ViewDefinition, matching_files};

/// A column as sniffed from a source file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbedColumn {
    pub name: String,
    pub data_type: String,
}

/// Registers raw views on a borrowed read-write connection
pub struct Registrar<'conn> {
    conn: &'conn Connection,
    schema: Ident,
}

impl<'conn> Registrar<'conn> {
    pub fn new(conn: &'conn Connection, schema: Ident) -> Self {
        Self { conn, schema }
    }

    #[must_use]
    pub fn schema(&self) -> &Ident {
        &self.schema
    }

    /// Create the raw schema if it does not exist yet
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {};", self.schema))?;
        Ok(())
    }

    /// Create or replace one raw view
    pub fn register(&self, view: &ViewDefinition) -> Result<()> {
        let name = view.name.as_str().to_string();

        for pattern in view.source.patterns() {
            let files = matching_files(pattern)?;
            if files.is_empty() {
                error!(
                    "View {name} has no source files matching {pattern}",
                    name: name,
                    pattern: pattern
                );
                return Err(Error::SourceNotFound {
                    view: name,
                    pattern: pattern.to_string(),
                });
            }
            debug!(
                "View {name}: {pattern} matches {count} files",
                name: name,
                pattern: pattern,
                count: files.len()
            );
        }

        if let SourceSpec::CsvUnion { branches } = &view.source {
            if branches.is_empty() {
                return Err(Error::Config(format!("union view {name} has no branches")));
            }
            let mut expected: Option<Vec<ProbedColumn>> = None;
            for (index, branch) in branches.iter().enumerate() {
                let columns = self.probe(&branch.select_sql())?;
                match &expected {
                    None => expected = Some(columns),
                    Some(first) => check_column_count(&name, first, &columns, index)?,
                }
            }
            // Column types are unified by the engine's binder.
            self.probe(&view.source.select_sql())
                .map_err(|e| Error::SchemaMismatch {
                    view: name.clone(),
                    detail: e.to_string(),
                })?;
        }

        let sql = format!(
            "CREATE OR REPLACE VIEW {} AS\n{};",
            self.schema.qualify(&view.name),
            view.source.select_sql()
        );
        debug!("Registering view {name}: {sql}", name: name, sql: sql);
        self.conn.execute_batch(&sql)?;
        info!("Registered raw view {name}", name: name);
        Ok(())
    }

    /// Register every view of a catalogue, stopping at the first failure
    pub fn register_all(&self, views: &[ViewDefinition]) -> Result<usize> {
        for view in views {
            self.register(view)?;
        }
        Ok(views.len())
    }

    /// Sniff the result columns of a query without reading its rows
    pub fn probe(&self, select: &str) -> Result<Vec<ProbedColumn>> {
        let mut stmt = self.conn.prepare(&format!("DESCRIBE {select}"))?;
        let rows = stmt.query_map([], |row| {
            Ok(ProbedColumn {
                name: row.get(0)?,
                data_type: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Names of the views currently in the raw schema, sorted
    pub fn list_views(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = ? AND table_type = 'VIEW' ORDER BY table_name",
        )?;
        let rows = stmt.query_map([self.schema.as_str()], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn check_column_count(
    view: &str,
    first: &[ProbedColumn],
    other: &[ProbedColumn],
    branch: usize,
) -> Result<()> {
    if first.len() != other.len() {
        return Err(Error::SchemaMismatch {
            view: view.to_string(),
            detail: format!(
                "branch 0 has {} columns, branch {branch} has {}",
                first.len(),
                other.len()
            ),
        });
    }
    Ok(())
}

/// Open (creating if needed) the warehouse database and register the raw catalogue
pub fn initialize(config: &WarehouseConfig) -> Result<usize> {
    let path = config.db_path();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.is_dir()
    {
        return Err(Error::connection_unavailable(
            &path,
            "parent directory does not exist",
        ));
    }
    let conn = Connection::open(&path).map_err(|e| Error::connection_unavailable(&path, e))?;

    let registrar = Registrar::new(&conn, config.raw_schema.clone());
    registrar.ensure_schema()?;
    let count = registrar.register_all(&config.catalog()?)?;

    let db = path.display().to_string();
    info!("Initialized {count} raw views in {db}", count: count, db: db);
    Ok(count)
}

/// Names of the raw views of an existing warehouse, read without write access
pub fn raw_views(config: &WarehouseConfig) -> Result<Vec<String>> {
    let conn = open_read_only(&config.db_path())?;
    Registrar::new(&conn, config.raw_schema.clone()).list_views()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, ty: &str) -> ProbedColumn {
        ProbedColumn {
            name: name.to_string(),
            data_type: ty.to_string(),
        }
    }

    #[test]
    fn test_column_count_mismatch() {
        let a = vec![col("time", "TIMESTAMP"), col("temp", "DOUBLE")];
        let b = vec![col("time", "TIMESTAMP")];
        let err = check_column_count("weather", &a, &b, 2);
        assert!(matches!(err, Err(Error::SchemaMismatch { ref detail, .. }) if detail.contains("branch 2 has 1")));
    }

    #[test]
    fn test_same_count_with_different_types_passes_count_check() {
        let a = vec![col("time", "TIMESTAMP"), col("snow", "VARCHAR")];
        let b = vec![col("time", "TIMESTAMP"), col("snow", "DOUBLE")];
        assert!(check_column_count("weather", &a, &b, 1).is_ok());
    }

    #[test]
    fn test_register_in_memory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let csv = dir.path().join("vendor_id.csv");
        std::fs::write(&csv, "vendor_id,vendor_name\n1,Creative Mobile\n2,VeriFone\n")?;

        let conn = Connection::open_in_memory()?;
        let registrar = Registrar::new(&conn, Ident::new("raw")?);
        registrar.ensure_schema()?;
        registrar.register(&ViewDefinition {
            name: Ident::new("vendor_id")?,
            source: SourceSpec::Dictionary {
                path: csv.to_string_lossy().into_owned(),
            },
        })?;

        assert_eq!(registrar.list_views()?, vec!["vendor_id".to_string()]);
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM raw.vendor_id", [], |r| r.get(0))?;
        assert_eq!(count, 2);
        Ok(())
    }
}
