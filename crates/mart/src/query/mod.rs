// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Query catalogue over the dimensional mart
//!
//! Every query is a value implementing [`MartQuery`]: it declares its result
//! schema, builds its SQL from validated identifiers only, binds its scalar
//! parameters, and reads rows into a typed struct.

mod params;
mod revenue;
mod trips;
mod weather;

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, FieldRef};
use arrow::record_batch::RecordBatch;
use duckdb::types::Value;
use serde::Serialize;

use crate::error::Result;
use crate::ident::Ident;

pub use params::{DateRange, Side, YearMonth};
pub use revenue::{
    AvgRevenueByVendor, DailyRevenue, MaxDailyRevenue, MonthlyRevenue, RevenueByYearMonth,
    VendorRevenue,
};
pub use trips::{
    AvgTripDistanceByBorough, BoroughDistance, CHRISTMAS_DAY, HolidayTrips,
    HolidayTripsByNeighborhood, NeighborhoodTrips, TripsByNeighborhood,
};
pub use weather::{
    BoroughSeasonTemperature, BoroughSeasonTemperatureRow, HeatmapMetric, TemperatureTrips,
    TipRate, TipRateByTemperature, TripsByApparentTemperature, WeatherAttribute, WeatherFlag,
    WeatherFlagRate, WeatherFlagRow, WeatherIntensityRate, WeatherIntensityRow,
    WeatherMultidim, WeatherMultidimRow,
};

/// Logical type of a result column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Boolean,
    Int32,
    Int64,
    Float64,
    Date,
}

impl ColumnType {
    #[must_use]
    pub fn arrow_type(self) -> DataType {
        match self {
            ColumnType::Text => DataType::Utf8,
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Int32 => DataType::Int32,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Date => DataType::Date32,
        }
    }
}

/// One column of a declared result schema
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    #[must_use]
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn nullable(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
        }
    }
}

/// Tables of the dimensional mart
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MartTable {
    FactTaxiTrip,
    Date,
    Zone,
    Weather,
    WeatherDt,
    Vendor,
}

impl MartTable {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MartTable::FactTaxiTrip => "dm_fact_taxi_trip",
            MartTable::Date => "dm_date",
            MartTable::Zone => "dm_zone",
            MartTable::Weather => "dm_weather",
            MartTable::WeatherDt => "dm_weather_dt",
            MartTable::Vendor => "dm_vendor",
        }
    }

    /// `"schema"."table"`
    pub fn qualified(self, schema: &Ident) -> Result<String> {
        Ok(schema.qualify(&Ident::new(self.name())?))
    }
}

/// A mart column a query depends on, checked before the query runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: MartTable,
    pub column: &'static str,
}

impl ColumnRef {
    #[must_use]
    pub fn new(table: MartTable, column: &'static str) -> Self {
        Self { table, column }
    }
}

/// References to several columns of one table
pub(crate) fn columns_of(table: MartTable, columns: &[&'static str]) -> Vec<ColumnRef> {
    columns.iter().map(|&c| ColumnRef::new(table, c)).collect()
}

// Dimension columns shared by several queries.
pub(crate) const ZONE_COLUMNS: &[&str] =
    &["key_zone", "neighborhood_name", "borough_name", "is_current"];
pub(crate) const WEATHER_COLUMNS: &[&str] = &["key_weather", "apparent_temperature_category"];

/// Qualified names of every mart table, resolved once per query
pub struct MartTables {
    pub fact: String,
    pub date: String,
    pub zone: String,
    pub weather: String,
    pub weather_dt: String,
    pub vendor: String,
}

impl MartTables {
    pub fn new(schema: &Ident) -> Result<Self> {
        Ok(Self {
            fact: MartTable::FactTaxiTrip.qualified(schema)?,
            date: MartTable::Date.qualified(schema)?,
            zone: MartTable::Zone.qualified(schema)?,
            weather: MartTable::Weather.qualified(schema)?,
            weather_dt: MartTable::WeatherDt.qualified(schema)?,
            vendor: MartTable::Vendor.qualified(schema)?,
        })
    }
}

/// A named, parameterized, read-only aggregate over the mart
pub trait MartQuery {
    type Row: Serialize;

    /// Stable name used in logs, errors and the CLI
    fn name(&self) -> &'static str;

    /// Declared result schema, in select-list order
    fn columns(&self) -> &'static [ColumnDef];

    /// Statement text; values appear only as `?` placeholders
    fn sql(&self, tables: &MartTables) -> Result<String>;

    /// Values bound to the placeholders, in order
    fn params(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Mart columns to verify before execution
    fn required_columns(&self) -> Vec<ColumnRef> {
        Vec::new()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<Self::Row>;
}

/// Materialized result of one façade call
#[derive(Clone, Debug, Serialize)]
pub struct QueryResult<R> {
    pub query: &'static str,
    pub columns: &'static [ColumnDef],
    pub rows: Vec<R>,
}

impl<R: Serialize> QueryResult<R> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Arrow fields built from the declared schema
    #[must_use]
    pub fn fields(&self) -> Vec<FieldRef> {
        self.columns
            .iter()
            .map(|c| Arc::new(Field::new(c.name, c.ty.arrow_type(), c.nullable)))
            .collect()
    }

    /// Convert to a single Arrow batch using the declared schema
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        Ok(serde_arrow::to_record_batch(&self.fields(), &self.rows)?)
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_json_rows(&self) -> Result<Vec<serde_json::Map<String, serde_json::Value>>> {
        self.rows
            .iter()
            .map(|row| match serde_json::to_value(row)? {
                serde_json::Value::Object(map) => Ok(map),
                other => Err(crate::error::Error::InvalidParameter(format!(
                    "row of {} did not serialize to an object: {other}",
                    self.query
                ))),
            })
            .collect()
    }
}

/// Read a `YYYY-MM-DD` text column as a date
pub(crate) fn get_date(row: &duckdb::Row<'_>, idx: usize) -> duckdb::Result<chrono::NaiveDate> {
    let text: String = row.get(idx)?;
    chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|e| {
        duckdb::Error::FromSqlConversionFailure(idx, duckdb::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    #[derive(Serialize)]
    struct Row {
        name: Option<String>,
        total: i64,
        rate: Option<f64>,
    }

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::nullable("name", ColumnType::Text),
        ColumnDef::new("total", ColumnType::Int64),
        ColumnDef::nullable("rate", ColumnType::Float64),
    ];

    fn result() -> QueryResult<Row> {
        QueryResult {
            query: "test",
            columns: COLUMNS,
            rows: vec![
                Row {
                    name: Some("Cold".into()),
                    total: 3,
                    rate: Some(0.25),
                },
                Row {
                    name: None,
                    total: 0,
                    rate: None,
                },
            ],
        }
    }

    #[test]
    fn test_record_batch_follows_declared_schema() -> Result<()> {
        let batch = result().to_record_batch()?;
        assert_eq!(batch.num_rows(), 2);
        let schema = batch.schema();
        assert_eq!(schema.field(0).name(), "name");
        assert_eq!(schema.field(1).data_type(), &DataType::Int64);
        assert_eq!(batch.column(2).null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_json_rows() -> Result<()> {
        let rows = result().to_json_rows()?;
        assert_eq!(rows[0]["name"], serde_json::json!("Cold"));
        assert!(rows[1]["rate"].is_null());
        Ok(())
    }

    #[test]
    fn test_columns_of() {
        let refs = columns_of(MartTable::Weather, WEATHER_COLUMNS);
        assert_eq!(refs.len(), 2);
        assert_eq!(
            refs[1],
            ColumnRef::new(MartTable::Weather, "apparent_temperature_category")
        );
    }

    #[test]
    fn test_mart_table_qualification() -> Result<()> {
        let schema = Ident::new("dwh_datamart")?;
        assert_eq!(
            MartTable::Zone.qualified(&schema)?,
            "\"dwh_datamart\".\"dm_zone\""
        );
        Ok(())
    }
}
