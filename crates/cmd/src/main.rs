// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::{QueryArgs, TaxiContext, init_command, query_command, views_command};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "taximart")]
struct Cli {
    /// Project root holding the database, the data directory and taximart.yaml
    #[arg(long, env = mart::ROOT_ENV, default_value = ".", global = true)]
    root: PathBuf,

    /// Configuration file to use instead of <root>/taximart.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if needed and register every raw view
    Init,
    /// List the registered raw views
    Views,
    /// Run a catalogue query against the dimensional mart
    Query(QueryArgs),
}

fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let ctx = TaxiContext::new(cli.root, cli.config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::Init => init_command(&ctx, &mut out)?,
        Commands::Views => views_command(&ctx, &mut out)?,
        Commands::Query(args) => query_command(&ctx, args, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
