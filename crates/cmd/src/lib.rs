// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod charts;
pub mod commands;
pub mod common;
pub mod output;

pub use commands::init::init_command;
pub use commands::query::{QueryArgs, QueryName, query_command};
pub use commands::views::views_command;
pub use common::TaxiContext;
pub use output::OutputFormat;
