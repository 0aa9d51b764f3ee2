// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Taxi trip warehouse over an embedded DuckDB file
//!
//! Two halves share one database:
//! - the registrar presents CSV and Parquet files as views in the raw schema;
//! - the façade runs a fixed catalogue of read-only aggregates over the
//!   dimensional mart, which is populated by an external transform.
//!
//! Results are typed rows with a declared column schema; [`present`] turns
//! them into chart specifications.

pub mod config;
pub mod error;
pub mod facade;
pub mod ident;
pub mod present;
pub mod query;
pub mod registrar;
pub mod source;

pub use config::{CONFIG_FILE, ROOT_ENV, WarehouseConfig};
pub use error::{Error, Result};
pub use facade::Facade;
pub use ident::Ident;
pub use present::{ChartBuilder, ChartKind, ChartSpec};
pub use query::{MartQuery, QueryResult};
pub use registrar::{Registrar, initialize, raw_views};
pub use source::{SourceSpec, ViewDefinition, default_catalog};
