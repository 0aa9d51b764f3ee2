// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Rendering query results for the terminal

use std::io::Write;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use arrow_csv::WriterBuilder;
use clap::ValueEnum;
use mart::{ChartSpec, QueryResult};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// CSV with a header row
    Csv,
    /// JSON array of row objects
    Json,
    /// JSON chart specification
    Chart,
}

/// Write `result` in `format`; `chart` is only invoked for chart output
pub fn write_result<R, F>(
    out: &mut dyn Write,
    result: &QueryResult<R>,
    format: OutputFormat,
    chart: F,
) -> Result<()>
where
    R: Serialize,
    F: FnOnce(&QueryResult<R>) -> mart::Result<ChartSpec>,
{
    match format {
        OutputFormat::Table => {
            if result.is_empty() {
                writeln!(out, "No results found.")?;
                return Ok(());
            }
            let batch = result.to_record_batch()?;
            let formatted = pretty_format_batches(&[batch])
                .with_context(|| format!("Failed to format {} as a table", result.query))?;
            writeln!(out, "{formatted}")?;
        }
        OutputFormat::Csv => {
            let batch = result.to_record_batch()?;
            let mut writer = WriterBuilder::new().with_header(true).build(out);
            writer
                .write(&batch)
                .with_context(|| format!("Failed to write {} as CSV", result.query))?;
        }
        OutputFormat::Json => {
            let rows = result.to_json_rows()?;
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        OutputFormat::Chart => {
            let spec = chart(result)
                .with_context(|| format!("Failed to build chart for {}", result.query))?;
            writeln!(out, "{}", spec.to_json()?)?;
        }
    }
    Ok(())
}
