// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mart::WarehouseConfig;

/// Project location and configuration source, as given on the command line
#[derive(Clone, Debug)]
pub struct TaxiContext {
    root: PathBuf,
    config_file: Option<PathBuf>,
}

impl TaxiContext {
    pub fn new<P: Into<PathBuf>>(root: P, config_file: Option<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_file,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the explicit config file, or `<root>/taximart.yaml`, or defaults
    pub fn load_config(&self) -> Result<WarehouseConfig> {
        match &self.config_file {
            Some(file) => WarehouseConfig::load_file(&self.root, file)
                .with_context(|| format!("Failed to load config {}", file.display())),
            None => WarehouseConfig::load(&self.root).with_context(|| {
                format!("Failed to load config under {}", self.root.display())
            }),
        }
    }
}
