// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Warehouse error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A raw view's path or glob matched no files
    #[error("No source files for view {view}: nothing matches {pattern}")]
    SourceNotFound { view: String, pattern: String },

    /// Union branches of a raw view disagree on column count or type
    #[error("Schema mismatch registering view {view}: {detail}")]
    SchemaMismatch { view: String, detail: String },

    /// The database file is absent or cannot be opened
    #[error("Database unavailable at {}: {reason}", path.display())]
    ConnectionUnavailable { path: PathBuf, reason: String },

    /// A column the query needs is absent from the mart
    #[error("Column {column} not found in {relation}")]
    ColumnNotFound { relation: String, column: String },

    /// A table the query needs is absent from the mart
    #[error("Table {table} not found")]
    TableNotFound { table: String },

    /// Query parameter rejected before execution
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Schema, view or column name that is not a plain SQL identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Configuration is malformed
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow conversion error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Result type for warehouse operations
pub type Result<T> = std::result::Result<T, Error>;

static MISSING_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Referenced column "([^"]+)" not found"#).expect("valid regex")
});

static MISSING_QUALIFIED_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Table "([^"]+)" does not have a column named "([^"]+)""#).expect("valid regex")
});

static MISSING_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Table with name ([^\s]+) does not exist").expect("valid regex")
});

impl Error {
    pub fn connection_unavailable<P: AsRef<Path>, S: ToString>(path: P, reason: S) -> Self {
        Error::ConnectionUnavailable {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn column_not_found<R: Into<String>, C: Into<String>>(relation: R, column: C) -> Self {
        Error::ColumnNotFound {
            relation: relation.into(),
            column: column.into(),
        }
    }

    /// Classify an engine failure raised while binding a mart query.
    ///
    /// Binder and catalog errors mean the mart drifted from the query
    /// catalogue; those become `ColumnNotFound` / `TableNotFound`.
    /// Everything else stays a plain DuckDB error.
    pub fn from_query_failure(query: &str, err: duckdb::Error) -> Self {
        let msg = err.to_string();
        if let Some(caps) = MISSING_QUALIFIED_COLUMN.captures(&msg) {
            return Error::column_not_found(&caps[1], &caps[2]);
        }
        if let Some(caps) = MISSING_COLUMN.captures(&msg) {
            return Error::column_not_found(query, &caps[1]);
        }
        if let Some(caps) = MISSING_TABLE.captures(&msg) {
            return Error::TableNotFound {
                table: caps[1].trim_end_matches('!').to_string(),
            };
        }
        Error::DuckDb(err)
    }
}
