// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Raw view source descriptions
//!
//! A [`ViewDefinition`] names a view in the raw schema and describes the
//! files behind it. Definitions are plain serde values so the catalogue can
//! be supplied from YAML configuration; [`default_catalog`] reproduces the
//! standard taxi warehouse layout.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use wax::Glob;

use crate::error::{Error, Result};
use crate::ident::{Ident, sql_literal};

fn default_true() -> bool {
    true
}

/// One branch of a CSV union
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UnionBranch {
    /// Path or glob of the CSV files in this branch
    pub pattern: String,

    #[serde(default = "default_true")]
    pub header: bool,

    /// Leading lines to skip before the header
    #[serde(default)]
    pub skip: u32,

    /// Literal column prepended to every row of this branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
}

/// A literal `value AS column` projected in front of a branch's columns
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Discriminator {
    pub column: Ident,
    pub value: String,
}

/// Files behind a raw view
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum SourceSpec {
    /// Auto-typed CSV, optionally skipping leading lines
    Csv {
        path: String,
        #[serde(default = "default_true")]
        header: bool,
        #[serde(default)]
        skip: u32,
    },
    /// Auto-typed Parquet over a glob
    Parquet { pattern: String },
    /// UNION ALL of CSV branches with per-branch discriminators
    CsvUnion { branches: Vec<UnionBranch> },
    /// Small id -> label reference table, read as-is
    Dictionary { path: String },
}

/// A named raw view and its source
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewDefinition {
    pub name: Ident,
    pub source: SourceSpec,
}

impl UnionBranch {
    /// The `SELECT` for this branch, without any union glue
    #[must_use]
    pub fn select_sql(&self) -> String {
        let reader = read_csv_sql(&self.pattern, self.header, self.skip);
        match &self.discriminator {
            Some(d) => format!("SELECT {} AS {}, * FROM {reader}", sql_literal(&d.value), d.column),
            None => format!("SELECT * FROM {reader}"),
        }
    }
}

fn read_csv_sql(path: &str, header: bool, skip: u32) -> String {
    let mut sql = format!("read_csv_auto({}, header = {header}", sql_literal(path));
    if skip > 0 {
        sql.push_str(&format!(", skip = {skip}"));
    }
    sql.push(')');
    sql
}

impl SourceSpec {
    /// Every path or glob this source reads, in branch order
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            SourceSpec::Csv { path, .. } | SourceSpec::Dictionary { path } => vec![path.as_str()],
            SourceSpec::Parquet { pattern } => vec![pattern.as_str()],
            SourceSpec::CsvUnion { branches } => {
                branches.iter().map(|b| b.pattern.as_str()).collect()
            }
        }
    }

    /// The query text the view is defined as
    #[must_use]
    pub fn select_sql(&self) -> String {
        match self {
            SourceSpec::Csv { path, header, skip } => {
                format!("SELECT * FROM {}", read_csv_sql(path, *header, *skip))
            }
            SourceSpec::Dictionary { path } => {
                format!("SELECT * FROM {}", read_csv_sql(path, true, 0))
            }
            SourceSpec::Parquet { pattern } => {
                format!("SELECT * FROM read_parquet({})", sql_literal(pattern))
            }
            SourceSpec::CsvUnion { branches } => branches
                .iter()
                .map(UnionBranch::select_sql)
                .collect::<Vec<_>>()
                .join("\nUNION ALL\n"),
        }
    }

    /// Resolve relative paths against `base`
    #[must_use]
    pub fn rebased(&self, base: &Path) -> SourceSpec {
        let join = |p: &str| -> String {
            if Path::new(p).is_absolute() {
                p.to_string()
            } else {
                base.join(p).to_string_lossy().into_owned()
            }
        };
        match self {
            SourceSpec::Csv { path, header, skip } => SourceSpec::Csv {
                path: join(path),
                header: *header,
                skip: *skip,
            },
            SourceSpec::Dictionary { path } => SourceSpec::Dictionary { path: join(path) },
            SourceSpec::Parquet { pattern } => SourceSpec::Parquet {
                pattern: join(pattern),
            },
            SourceSpec::CsvUnion { branches } => SourceSpec::CsvUnion {
                branches: branches
                    .iter()
                    .map(|b| UnionBranch {
                        pattern: join(&b.pattern),
                        ..b.clone()
                    })
                    .collect(),
            },
        }
    }
}

fn has_glob_syntax(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

/// Split a pattern into its literal leading directory and the glob tail.
///
/// Only the tail is handed to the glob engine, so characters in the
/// literal directory (temp dirs, project paths) need no escaping.
fn split_pattern(pattern: &str) -> (PathBuf, Option<String>) {
    let path = Path::new(pattern);
    let mut prefix = PathBuf::new();
    let mut components = path.components();
    while let Some(component) = components.next() {
        if let Component::Normal(part) = component
            && has_glob_syntax(&part.to_string_lossy())
        {
            let mut tail = vec![part.to_string_lossy().into_owned()];
            tail.extend(
                components
                    .by_ref()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned()),
            );
            return (prefix, Some(tail.join("/")));
        }
        prefix.push(component.as_os_str());
    }
    (prefix, None)
}

/// List the files a path or glob matches, sorted
pub fn matching_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let (prefix, tail) = split_pattern(pattern);
    let Some(tail) = tail else {
        return Ok(if prefix.is_file() { vec![prefix] } else { vec![] });
    };
    if !prefix.is_dir() {
        return Ok(vec![]);
    }

    let glob = Glob::new(&tail)
        .map_err(|e| Error::Config(format!("bad glob {pattern}: {e}")))?;

    let mut files = Vec::new();
    for entry in glob.walk(prefix.clone()) {
        let entry = entry.map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
        if entry.path().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

const WEATHER_BRANCHES: &[(&str, &str)] = &[
    ("Bronx", "Bronx"),
    ("Brooklyn", "Brooklyn"),
    ("Manhattan", "Manhattan"),
    ("StatenIsland", "Staten Island"),
    ("Queens", "Queens"),
    ("EWR", "EWR"),
];

/// Leading metadata lines in the per-borough weather exports
pub const WEATHER_SKIP_LINES: u32 = 3;

/// The standard raw catalogue, paths relative to the data directory
pub fn default_catalog() -> Result<Vec<ViewDefinition>> {
    let csv = |path: &str| SourceSpec::Csv {
        path: path.to_string(),
        header: true,
        skip: 0,
    };
    let dictionary = |path: &str| SourceSpec::Dictionary {
        path: path.to_string(),
    };
    let borough_name = Ident::new("borough_name")?;

    let weather = SourceSpec::CsvUnion {
        branches: WEATHER_BRANCHES
            .iter()
            .map(|(dir, label)| UnionBranch {
                pattern: format!("weather_dt/Weather_{dir}/*.csv"),
                header: true,
                skip: WEATHER_SKIP_LINES,
                discriminator: Some(Discriminator {
                    column: borough_name.clone(),
                    value: (*label).to_string(),
                }),
            })
            .collect(),
    };

    let views = [
        ("borough", csv("zones/borough.csv")),
        ("neighborhood", csv("zones/taxi_zone_lookup.csv")),
        (
            "taxi_trip",
            SourceSpec::Parquet {
                pattern: "taxi_trip/*.parquet".to_string(),
            },
        ),
        ("weather", weather),
        ("vendor_id", dictionary("taxi_trip/vendor_id.csv")),
        ("ratecode_id", dictionary("taxi_trip/ratecode_id.csv")),
        ("payment_type", dictionary("taxi_trip/payment_type.csv")),
    ];

    views
        .into_iter()
        .map(|(name, source)| {
            Ok(ViewDefinition {
                name: Ident::new(name)?,
                source,
            })
        })
        .collect()
}
