// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Validated SQL names.
//!
//! Schema, view and column names are never spliced into SQL as raw strings.
//! They pass through [`Ident`], which accepts only plain identifiers and
//! renders them quoted. File paths embedded in table functions go through
//! [`sql_literal`]; all other values are bound parameters.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

static IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("valid regex"));

/// A plain SQL identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();
        if IDENT.is_match(&name) {
            Ok(Ident(name))
        } else {
            Err(Error::InvalidIdentifier(name))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `"schema"."name"`
    #[must_use]
    pub fn qualify(&self, name: &Ident) -> String {
        format!("{self}.{name}")
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The regex rules out embedded quotes.
        write!(f, "\"{}\"", self.0)
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ident::new(s).map_err(serde::de::Error::custom)
    }
}

/// Render a string as a single-quoted SQL literal.
#[must_use]
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        for name in ["raw", "dwh_datamart", "dm_fact_taxi_trip", "_x1"] {
            assert!(Ident::new(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejects_injection() {
        for name in ["", "1abc", "a b", "x\"; DROP TABLE y; --", "a.b", "rain-intensity"] {
            assert!(
                matches!(Ident::new(name), Err(Error::InvalidIdentifier(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn test_qualify_quotes_both_parts() -> Result<()> {
        let schema = Ident::new("raw")?;
        let view = Ident::new("weather")?;
        assert_eq!(schema.qualify(&view), "\"raw\".\"weather\"");
        Ok(())
    }

    #[test]
    fn test_sql_literal_escapes_quotes() {
        assert_eq!(sql_literal("O'Hare"), "'O''Hare'");
        assert_eq!(sql_literal("/data/a.csv"), "'/data/a.csv'");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: std::result::Result<Ident, _> = serde_json::from_str("\"borough_name\"");
        assert!(ok.is_ok());
        let bad: std::result::Result<Ident, _> = serde_json::from_str("\"borough name\"");
        assert!(bad.is_err());
    }
}
