// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result};

use crate::common::TaxiContext;

/// Create the database if needed and (re)register every raw view
pub fn init_command(ctx: &TaxiContext, out: &mut dyn Write) -> Result<()> {
    let config = ctx.load_config()?;
    let db = config.db_path();
    let count = mart::initialize(&config)
        .with_context(|| format!("Failed to initialize warehouse at {}", db.display()))?;
    writeln!(out, "Registered {count} raw views in {}", db.display())?;
    Ok(())
}
