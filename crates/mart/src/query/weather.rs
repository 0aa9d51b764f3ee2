// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Weather-dimension aggregates
//!
//! Category columns (temperature, rain, wind, snow buckets) are free-form
//! strings from the mart. Nothing here filters on a fixed set of labels;
//! display ordering is a presentation concern.
//!
//! Every ratio divides by `NULLIF(denominator, 0)`: a zero denominator
//! yields NULL.

use std::fmt;
use std::str::FromStr;

use duckdb::types::Value;
use serde::Serialize;

use super::params::DateRange;
use super::{
    ColumnDef, ColumnRef, ColumnType, MartQuery, MartTable, MartTables, WEATHER_COLUMNS,
    ZONE_COLUMNS, columns_of,
};
use crate::error::{Error, Result};
use crate::ident::Ident;

const RANGE_FILTER: &str = "d.date >= CAST(? AS DATE)\n  AND d.date < CAST(? AS DATE)";

/// Pickup-borough x weekday x season KPIs over a date range
#[derive(Clone, Copy, Debug, Default)]
pub struct WeatherMultidim {
    pub range: DateRange,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeatherMultidimRow {
    pub pickup_borough: Option<String>,
    pub day_name: Option<String>,
    pub is_weekend: Option<bool>,
    pub season: Option<String>,
    pub total_trips: i64,
    pub total_revenue: Option<f64>,
    pub avg_fare: Option<f64>,
    pub avg_distance: Option<f64>,
    pub avg_duration: Option<f64>,
    pub total_tips: Option<f64>,
    pub revenue_per_trip: Option<f64>,
    pub distance_per_trip: Option<f64>,
}

const MULTIDIM: &[ColumnDef] = &[
    ColumnDef::nullable("pickup_borough", ColumnType::Text),
    ColumnDef::nullable("day_name", ColumnType::Text),
    ColumnDef::nullable("is_weekend", ColumnType::Boolean),
    ColumnDef::nullable("season", ColumnType::Text),
    ColumnDef::new("total_trips", ColumnType::Int64),
    ColumnDef::nullable("total_revenue", ColumnType::Float64),
    ColumnDef::nullable("avg_fare", ColumnType::Float64),
    ColumnDef::nullable("avg_distance", ColumnType::Float64),
    ColumnDef::nullable("avg_duration", ColumnType::Float64),
    ColumnDef::nullable("total_tips", ColumnType::Float64),
    ColumnDef::nullable("revenue_per_trip", ColumnType::Float64),
    ColumnDef::nullable("distance_per_trip", ColumnType::Float64),
];

impl MartQuery for WeatherMultidim {
    type Row = WeatherMultidimRow;

    fn name(&self) -> &'static str {
        "weather_multidim"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        MULTIDIM
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "SELECT
    lower(CAST(zp.borough_name AS VARCHAR)) AS pickup_borough,
    CAST(d.day_name AS VARCHAR) AS day_name,
    CAST(d.is_weekend AS BOOLEAN) AS is_weekend,
    CAST(d.season AS VARCHAR) AS season,
    COUNT(*) AS total_trips,
    CAST(SUM(f.total_amount) AS DOUBLE) AS total_revenue,
    CAST(AVG(f.total_amount) AS DOUBLE) AS avg_fare,
    CAST(AVG(f.trip_distance) AS DOUBLE) AS avg_distance,
    CAST(AVG(f.trip_duration_minutes) AS DOUBLE) AS avg_duration,
    CAST(SUM(f.tip_amount) AS DOUBLE) AS total_tips,
    CAST(SUM(f.total_amount) / NULLIF(COUNT(*), 0) AS DOUBLE) AS revenue_per_trip,
    CAST(SUM(f.trip_distance) / NULLIF(COUNT(*), 0) AS DOUBLE) AS distance_per_trip
FROM {fact} f
JOIN {zone} zp
    ON f.key_zone_pickup = zp.key_zone
    AND zp.is_current = TRUE
JOIN {date} d
    ON f.key_date_pickup = d.key_date
WHERE {RANGE_FILTER}
GROUP BY zp.borough_name, d.day_name, d.is_weekend, d.season
ORDER BY total_revenue DESC",
            fact = t.fact,
            zone = t.zone,
            date = t.date,
        ))
    }

    fn params(&self) -> Vec<Value> {
        self.range.bind_values().to_vec()
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(
                MartTable::FactTaxiTrip,
                &[
                    "key_zone_pickup",
                    "key_date_pickup",
                    "total_amount",
                    "trip_distance",
                    "trip_duration_minutes",
                    "tip_amount",
                ],
            ),
            columns_of(MartTable::Zone, ZONE_COLUMNS),
            columns_of(
                MartTable::Date,
                &["key_date", "date", "day_name", "is_weekend", "season"],
            ),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<WeatherMultidimRow> {
        Ok(WeatherMultidimRow {
            pickup_borough: row.get(0)?,
            day_name: row.get(1)?,
            is_weekend: row.get(2)?,
            season: row.get(3)?,
            total_trips: row.get(4)?,
            total_revenue: row.get(5)?,
            avg_fare: row.get(6)?,
            avg_distance: row.get(7)?,
            avg_duration: row.get(8)?,
            total_tips: row.get(9)?,
            revenue_per_trip: row.get(10)?,
            distance_per_trip: row.get(11)?,
        })
    }
}

/// Trip counts per apparent-temperature category
#[derive(Clone, Copy, Debug, Default)]
pub struct TripsByApparentTemperature;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TemperatureTrips {
    pub apparent_temperature_category: Option<String>,
    pub total_trips: i64,
}

const TEMPERATURE_TRIPS: &[ColumnDef] = &[
    ColumnDef::nullable("apparent_temperature_category", ColumnType::Text),
    ColumnDef::new("total_trips", ColumnType::Int64),
];

impl MartQuery for TripsByApparentTemperature {
    type Row = TemperatureTrips;

    fn name(&self) -> &'static str {
        "trips_by_apparent_temperature"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        TEMPERATURE_TRIPS
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "SELECT
    CAST(w.apparent_temperature_category AS VARCHAR) AS apparent_temperature_category,
    COUNT(*) AS total_trips
FROM {fact} f
JOIN {weather} w
    ON f.key_weather = w.key_weather
GROUP BY w.apparent_temperature_category
ORDER BY total_trips DESC",
            fact = t.fact,
            weather = t.weather,
        ))
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(MartTable::FactTaxiTrip, &["key_weather"]),
            columns_of(MartTable::Weather, WEATHER_COLUMNS),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<TemperatureTrips> {
        Ok(TemperatureTrips {
            apparent_temperature_category: row.get(0)?,
            total_trips: row.get(1)?,
        })
    }
}

/// A numeric column of [`BoroughSeasonTemperature`] a heatmap can bind to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HeatmapMetric {
    TotalTrips,
    #[default]
    TotalRevenue,
    AvgFare,
}

impl HeatmapMetric {
    pub const ALL: [HeatmapMetric; 3] = [
        HeatmapMetric::TotalTrips,
        HeatmapMetric::TotalRevenue,
        HeatmapMetric::AvgFare,
    ];

    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            HeatmapMetric::TotalTrips => "total_trips",
            HeatmapMetric::TotalRevenue => "total_revenue",
            HeatmapMetric::AvgFare => "avg_fare",
        }
    }
}

impl fmt::Display for HeatmapMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for HeatmapMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.column() == s)
            .ok_or_else(|| Error::column_not_found("borough_season_temperature", s))
    }
}

/// Pickup borough x season x apparent-temperature KPIs over a date range
#[derive(Clone, Copy, Debug, Default)]
pub struct BoroughSeasonTemperature {
    pub range: DateRange,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoroughSeasonTemperatureRow {
    pub pickup_borough: Option<String>,
    pub season: Option<String>,
    pub apparent_temperature_category: Option<String>,
    pub total_trips: i64,
    pub total_revenue: Option<f64>,
    pub avg_fare: Option<f64>,
}

const BOROUGH_SEASON_TEMPERATURE: &[ColumnDef] = &[
    ColumnDef::nullable("pickup_borough", ColumnType::Text),
    ColumnDef::nullable("season", ColumnType::Text),
    ColumnDef::nullable("apparent_temperature_category", ColumnType::Text),
    ColumnDef::new("total_trips", ColumnType::Int64),
    ColumnDef::nullable("total_revenue", ColumnType::Float64),
    ColumnDef::nullable("avg_fare", ColumnType::Float64),
];

impl MartQuery for BoroughSeasonTemperature {
    type Row = BoroughSeasonTemperatureRow;

    fn name(&self) -> &'static str {
        "borough_season_temperature"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        BOROUGH_SEASON_TEMPERATURE
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "SELECT
    CAST(zp.borough_name AS VARCHAR) AS pickup_borough,
    CAST(d.season AS VARCHAR) AS season,
    CAST(w.apparent_temperature_category AS VARCHAR) AS apparent_temperature_category,
    COUNT(*) AS total_trips,
    CAST(SUM(f.total_amount) AS DOUBLE) AS total_revenue,
    CAST(AVG(f.total_amount) AS DOUBLE) AS avg_fare
FROM {fact} f
JOIN {zone} zp
    ON f.key_zone_pickup = zp.key_zone
    AND zp.is_current = TRUE
JOIN {date} d
    ON f.key_date_pickup = d.key_date
LEFT JOIN {weather} w
    ON f.key_weather = w.key_weather
WHERE {RANGE_FILTER}
GROUP BY zp.borough_name, d.season, w.apparent_temperature_category
ORDER BY total_revenue DESC",
            fact = t.fact,
            zone = t.zone,
            date = t.date,
            weather = t.weather,
        ))
    }

    fn params(&self) -> Vec<Value> {
        self.range.bind_values().to_vec()
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(
                MartTable::FactTaxiTrip,
                &["key_zone_pickup", "key_date_pickup", "key_weather", "total_amount"],
            ),
            columns_of(MartTable::Zone, ZONE_COLUMNS),
            columns_of(MartTable::Date, &["key_date", "date", "season"]),
            columns_of(MartTable::Weather, WEATHER_COLUMNS),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<BoroughSeasonTemperatureRow> {
        Ok(BoroughSeasonTemperatureRow {
            pickup_borough: row.get(0)?,
            season: row.get(1)?,
            apparent_temperature_category: row.get(2)?,
            total_trips: row.get(3)?,
            total_revenue: row.get(4)?,
            avg_fare: row.get(5)?,
        })
    }
}

/// Tip rate per apparent-temperature category over a date range.
///
/// Every category known to the weather dimension is listed, including those
/// with no trips in the range; trips without weather form the NULL category.
#[derive(Clone, Copy, Debug, Default)]
pub struct TipRateByTemperature {
    pub range: DateRange,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TipRate {
    pub apparent_temperature_category: Option<String>,
    pub total_trips: i64,
    pub total_tips: f64,
    pub avg_tip: Option<f64>,
    pub tip_rate: Option<f64>,
}

const TIP_RATE: &[ColumnDef] = &[
    ColumnDef::nullable("apparent_temperature_category", ColumnType::Text),
    ColumnDef::new("total_trips", ColumnType::Int64),
    ColumnDef::new("total_tips", ColumnType::Float64),
    ColumnDef::nullable("avg_tip", ColumnType::Float64),
    ColumnDef::nullable("tip_rate", ColumnType::Float64),
];

impl MartQuery for TipRateByTemperature {
    type Row = TipRate;

    fn name(&self) -> &'static str {
        "tip_rate_by_temperature"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        TIP_RATE
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "WITH trips AS (
    SELECT
        CAST(w.apparent_temperature_category AS VARCHAR) AS category,
        1 AS trip,
        f.tip_amount,
        f.total_amount
    FROM {fact} f
    JOIN {date} d
        ON f.key_date_pickup = d.key_date
    LEFT JOIN {weather} w
        ON f.key_weather = w.key_weather
    WHERE {RANGE_FILTER}
),
categories AS (
    SELECT CAST(apparent_temperature_category AS VARCHAR) AS category FROM {weather}
    UNION
    SELECT category FROM trips
)
SELECT
    c.category AS apparent_temperature_category,
    COUNT(t.trip) AS total_trips,
    CAST(COALESCE(SUM(t.tip_amount), 0) AS DOUBLE) AS total_tips,
    CAST(AVG(t.tip_amount) AS DOUBLE) AS avg_tip,
    CAST(SUM(t.tip_amount) / NULLIF(SUM(t.total_amount), 0) AS DOUBLE) AS tip_rate
FROM categories c
LEFT JOIN trips t
    ON t.category IS NOT DISTINCT FROM c.category
GROUP BY c.category
ORDER BY tip_rate DESC NULLS LAST",
            fact = t.fact,
            date = t.date,
            weather = t.weather,
        ))
    }

    fn params(&self) -> Vec<Value> {
        self.range.bind_values().to_vec()
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(
                MartTable::FactTaxiTrip,
                &["key_date_pickup", "key_weather", "tip_amount", "total_amount"],
            ),
            columns_of(MartTable::Date, &["key_date", "date"]),
            columns_of(MartTable::Weather, WEATHER_COLUMNS),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<TipRate> {
        Ok(TipRate {
            apparent_temperature_category: row.get(0)?,
            total_trips: row.get(1)?,
            total_tips: row.get(2)?,
            avg_tip: row.get(3)?,
            tip_rate: row.get(4)?,
        })
    }
}

/// Boolean weather flags of `dm_weather_dt`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherFlag {
    Rainy,
    Snowy,
}

impl WeatherFlag {
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            WeatherFlag::Rainy => "is_rainy",
            WeatherFlag::Snowy => "is_snowy",
        }
    }

    /// The weather the flag marks, in lower case
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            WeatherFlag::Rainy => "rain",
            WeatherFlag::Snowy => "snow",
        }
    }

    /// Display labels for a set and an unset flag
    #[must_use]
    pub fn labels(self) -> (&'static str, &'static str) {
        match self {
            WeatherFlag::Rainy => ("Rainy", "Not rainy"),
            WeatherFlag::Snowy => ("Snowy", "Not snowy"),
        }
    }
}

impl FromStr for WeatherFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "is_rainy" | "rainy" | "rain" => Ok(WeatherFlag::Rainy),
            "is_snowy" | "snowy" | "snow" => Ok(WeatherFlag::Snowy),
            other => Err(Error::column_not_found(MartTable::WeatherDt.name(), other)),
        }
    }
}

/// Categorical weather attributes of `dm_weather_dt`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherAttribute {
    RainIntensity,
    WindIntensity,
    SnowIntensity,
    TemperatureCategory,
}

impl WeatherAttribute {
    pub const ALL: [WeatherAttribute; 4] = [
        WeatherAttribute::RainIntensity,
        WeatherAttribute::WindIntensity,
        WeatherAttribute::SnowIntensity,
        WeatherAttribute::TemperatureCategory,
    ];

    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            WeatherAttribute::RainIntensity => "rain_intensity",
            WeatherAttribute::WindIntensity => "wind_intensity",
            WeatherAttribute::SnowIntensity => "snow_intensity",
            WeatherAttribute::TemperatureCategory => "temperature_category",
        }
    }
}

impl fmt::Display for WeatherAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for WeatherAttribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.column() == s)
            .ok_or_else(|| Error::column_not_found(MartTable::WeatherDt.name(), s))
    }
}

/// Shared shape of the per-weather-record rate queries.
///
/// `bucket` is a validated `dm_weather_dt` column. Trips are counted per
/// bucket (and borough), then divided by the number of distinct weather
/// records in the bucket.
fn weather_rate_sql(t: &MartTables, bucket: &Ident, cast: &str, by_borough: bool) -> String {
    let (borough_select, zone_join, borough_out) = if by_borough {
        (
            "\n        CAST(z.borough_name AS VARCHAR) AS borough,".to_string(),
            format!(
                "\n    JOIN {zone} z\n        ON z.key_zone = t.key_zone_pickup\n        AND z.is_current = TRUE",
                zone = t.zone
            ),
            "t.borough",
        )
    } else {
        (String::new(), String::new(), "CAST(NULL AS VARCHAR)")
    };

    format!(
        "WITH weather_totals AS (
    SELECT
        CAST({bucket} AS {cast}) AS bucket,
        COUNT(DISTINCT key_weather) AS total_weather
    FROM {weather_dt}
    GROUP BY ALL
),
taxi_totals AS (
    SELECT
        CAST(w.{bucket} AS {cast}) AS bucket,{borough_select}
        COUNT(*) AS taxi_trips
    FROM {fact} t
    JOIN {weather_dt} w
        ON w.key_weather = t.key_weather{zone_join}
    GROUP BY ALL
)
SELECT
    t.bucket,
    {borough_out} AS borough,
    t.taxi_trips,
    CAST(ROUND(t.taxi_trips / NULLIF(w.total_weather, 0), 2) AS DOUBLE) AS rate
FROM taxi_totals t
JOIN weather_totals w
    ON t.bucket IS NOT DISTINCT FROM w.bucket
ORDER BY 2, 1",
        fact = t.fact,
        weather_dt = t.weather_dt,
    )
}

fn weather_rate_columns(bucket: &'static str, by_borough: bool) -> Vec<ColumnRef> {
    let mut columns = columns_of(MartTable::WeatherDt, &["key_weather", bucket]);
    if by_borough {
        columns.extend(columns_of(
            MartTable::FactTaxiTrip,
            &["key_weather", "key_zone_pickup"],
        ));
        columns.extend(columns_of(MartTable::Zone, ZONE_COLUMNS));
    } else {
        columns.extend(columns_of(MartTable::FactTaxiTrip, &["key_weather"]));
    }
    columns
}

/// Trips per weather record, split on a boolean flag
#[derive(Clone, Copy, Debug)]
pub struct WeatherFlagRate {
    pub flag: WeatherFlag,
    pub by_borough: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeatherFlagRow {
    pub flag_value: Option<bool>,
    pub borough: Option<String>,
    pub taxi_trips: i64,
    pub trips_per_weather: Option<f64>,
}

const WEATHER_FLAG: &[ColumnDef] = &[
    ColumnDef::nullable("flag_value", ColumnType::Boolean),
    ColumnDef::nullable("borough", ColumnType::Text),
    ColumnDef::new("taxi_trips", ColumnType::Int64),
    ColumnDef::nullable("trips_per_weather", ColumnType::Float64),
];

impl MartQuery for WeatherFlagRate {
    type Row = WeatherFlagRow;

    fn name(&self) -> &'static str {
        match (self.flag, self.by_borough) {
            (WeatherFlag::Rainy, false) => "rainy_trips_per_weather",
            (WeatherFlag::Rainy, true) => "rainy_trips_per_weather_by_borough",
            (WeatherFlag::Snowy, false) => "snowy_trips_per_weather",
            (WeatherFlag::Snowy, true) => "snowy_trips_per_weather_by_borough",
        }
    }

    fn columns(&self) -> &'static [ColumnDef] {
        WEATHER_FLAG
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        let bucket = Ident::new(self.flag.column())?;
        Ok(weather_rate_sql(t, &bucket, "BOOLEAN", self.by_borough))
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        weather_rate_columns(self.flag.column(), self.by_borough)
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<WeatherFlagRow> {
        Ok(WeatherFlagRow {
            flag_value: row.get(0)?,
            borough: row.get(1)?,
            taxi_trips: row.get(2)?,
            trips_per_weather: row.get(3)?,
        })
    }
}

/// Trips per weather record, split on a categorical weather attribute
#[derive(Clone, Copy, Debug)]
pub struct WeatherIntensityRate {
    pub attribute: WeatherAttribute,
    pub by_borough: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeatherIntensityRow {
    pub intensity: Option<String>,
    pub borough: Option<String>,
    pub taxi_trips: i64,
    pub trips_per_category: Option<f64>,
}

const WEATHER_INTENSITY: &[ColumnDef] = &[
    ColumnDef::nullable("intensity", ColumnType::Text),
    ColumnDef::nullable("borough", ColumnType::Text),
    ColumnDef::new("taxi_trips", ColumnType::Int64),
    ColumnDef::nullable("trips_per_category", ColumnType::Float64),
];

impl MartQuery for WeatherIntensityRate {
    type Row = WeatherIntensityRow;

    fn name(&self) -> &'static str {
        if self.by_borough {
            "trips_per_weather_category_by_borough"
        } else {
            "trips_per_weather_category"
        }
    }

    fn columns(&self) -> &'static [ColumnDef] {
        WEATHER_INTENSITY
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        let bucket = Ident::new(self.attribute.column())?;
        Ok(weather_rate_sql(t, &bucket, "VARCHAR", self.by_borough))
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        weather_rate_columns(self.attribute.column(), self.by_borough)
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<WeatherIntensityRow> {
        Ok(WeatherIntensityRow {
            intensity: row.get(0)?,
            borough: row.get(1)?,
            taxi_trips: row.get(2)?,
            trips_per_category: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> MartTables {
        MartTables::new(&Ident::new("dwh_datamart").expect("ident")).expect("tables")
    }

    #[test]
    fn test_attribute_names() -> Result<()> {
        assert_eq!(
            "wind_intensity".parse::<WeatherAttribute>()?,
            WeatherAttribute::WindIntensity
        );
        let err = "humidity".parse::<WeatherAttribute>();
        assert!(matches!(
            err,
            Err(Error::ColumnNotFound { ref relation, ref column })
                if relation == "dm_weather_dt" && column == "humidity"
        ));
        Ok(())
    }

    #[test]
    fn test_heatmap_metric_names() -> Result<()> {
        assert_eq!("avg_fare".parse::<HeatmapMetric>()?, HeatmapMetric::AvgFare);
        assert!(matches!(
            "median_fare".parse::<HeatmapMetric>(),
            Err(Error::ColumnNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_rate_sql_guards_zero_denominator() -> Result<()> {
        let q = WeatherIntensityRate {
            attribute: WeatherAttribute::RainIntensity,
            by_borough: true,
        };
        let sql = q.sql(&tables())?;
        assert!(sql.contains("NULLIF(w.total_weather, 0)"));
        assert!(sql.contains("CAST(w.\"rain_intensity\" AS VARCHAR) AS bucket"));
        assert!(sql.contains("z.is_current = TRUE"));
        let required = q.required_columns();
        assert!(required.contains(&ColumnRef::new(MartTable::WeatherDt, "rain_intensity")));
        assert!(required.contains(&ColumnRef::new(MartTable::Zone, "is_current")));
        Ok(())
    }

    #[test]
    fn test_rate_sql_without_borough_has_no_zone_join() -> Result<()> {
        let q = WeatherFlagRate {
            flag: WeatherFlag::Snowy,
            by_borough: false,
        };
        let sql = q.sql(&tables())?;
        assert!(!sql.contains("dm_zone"));
        assert!(sql.contains("CAST(NULL AS VARCHAR) AS borough"));
        assert!(q.required_columns().iter().all(|c| c.table != MartTable::Zone));
        Ok(())
    }

    #[test]
    fn test_range_queries_bind_two_dates() {
        let q = TipRateByTemperature::default();
        assert_eq!(q.params().len(), 2);
        let q = WeatherMultidim::default();
        assert_eq!(q.params().len(), 2);
    }
}
