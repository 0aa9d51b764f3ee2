// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use diagnostics::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ident::Ident;
use crate::source::{ViewDefinition, default_catalog};

/// File name looked up in the project root when no config path is given
pub const CONFIG_FILE: &str = "taximart.yaml";

/// Environment variable naming the project root
pub const ROOT_ENV: &str = "TAXIMART_ROOT";

/// Warehouse configuration
///
/// Relative paths resolve against the project root.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WarehouseConfig {
    /// Set from the location the config was loaded for, never read from YAML
    #[serde(skip)]
    pub project_root: PathBuf,

    /// Embedded database file
    pub db_file: PathBuf,

    /// Directory holding `zones/`, `taxi_trip/` and `weather_dt/`
    pub data_dir: PathBuf,

    /// Schema holding the raw views
    pub raw_schema: Ident,

    /// Schema holding the externally built dimensional mart
    pub mart_schema: Ident,

    /// Raw view catalogue; the standard layout when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<Vec<ViewDefinition>>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            db_file: PathBuf::from("taxi_trips.duckdb"),
            data_dir: PathBuf::from("data"),
            raw_schema: Ident::new("raw").expect("valid identifier"),
            mart_schema: Ident::new("dwh_datamart").expect("valid identifier"),
            views: None,
        }
    }
}

impl WarehouseConfig {
    /// Defaults rooted at `root`
    pub fn for_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            project_root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load `<root>/taximart.yaml`, falling back to defaults when it is absent
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let path = root.join(CONFIG_FILE);
        if path.exists() {
            Self::load_file(root, &path)
        } else {
            debug!(
                "No config at {config_path}, using defaults",
                config_path: path.display().to_string()
            );
            Ok(Self::for_root(root))
        }
    }

    /// Load an explicit config file for the project at `root`
    pub fn load_file<P: AsRef<Path>, F: AsRef<Path>>(root: P, file: F) -> Result<Self> {
        let content = std::fs::read_to_string(file.as_ref())?;
        let mut config = Self::from_yaml(&content)?;
        config.project_root = root.as_ref().to_path_buf();
        info!(
            "Loaded configuration from {config_path}",
            config_path: file.as_ref().display().to_string()
        );
        Ok(config)
    }

    /// Parse and validate YAML configuration text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: WarehouseConfig = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.db_file.as_os_str().is_empty() {
            return Err(Error::Config("db_file cannot be empty".to_string()));
        }
        if self.raw_schema == self.mart_schema {
            return Err(Error::Config(format!(
                "raw_schema and mart_schema must differ, both are {}",
                self.raw_schema.as_str()
            )));
        }
        if let Some(views) = &self.views {
            let mut names: Vec<&str> = views.iter().map(|v| v.name.as_str()).collect();
            names.sort_unstable();
            if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
                return Err(Error::Config(format!("view {} defined twice", dup[0])));
            }
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Resolved database file path
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.resolve(&self.db_file)
    }

    /// Resolved data directory
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    /// The raw view catalogue with every source rebased onto the data directory
    pub fn catalog(&self) -> Result<Vec<ViewDefinition>> {
        let views = match &self.views {
            Some(views) => views.clone(),
            None => default_catalog()?,
        };
        let data = self.data_path();
        Ok(views
            .into_iter()
            .map(|v| ViewDefinition {
                source: v.source.rebased(&data),
                name: v.name,
            })
            .collect())
    }
}
