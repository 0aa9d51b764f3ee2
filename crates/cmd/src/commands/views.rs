// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result};

use crate::common::TaxiContext;

/// List the registered raw views, one per line
pub fn views_command(ctx: &TaxiContext, out: &mut dyn Write) -> Result<()> {
    let config = ctx.load_config()?;
    let views = mart::raw_views(&config).with_context(|| {
        format!("Failed to list views in {}", config.db_path().display())
    })?;
    if views.is_empty() {
        writeln!(out, "No raw views in schema {}.", config.raw_schema.as_str())?;
    }
    for view in views {
        writeln!(out, "{}.{view}", config.raw_schema.as_str())?;
    }
    Ok(())
}
