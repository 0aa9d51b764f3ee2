// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Small dimensional mart in a scratch DuckDB file

#![allow(dead_code)]

use duckdb::Connection;
use mart::WarehouseConfig;
use tempfile::{TempDir, tempdir};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const SCHEMA: &str = r#"
CREATE SCHEMA dwh_datamart;

CREATE TABLE dwh_datamart.dm_date (
    key_date INTEGER, date DATE, year INTEGER, month_name VARCHAR, day_name VARCHAR,
    is_weekend BOOLEAN, season VARCHAR, is_holiday BOOLEAN, holiday_name VARCHAR
);
CREATE TABLE dwh_datamart.dm_zone (
    key_zone INTEGER, neighborhood_name VARCHAR, borough_name VARCHAR, is_current BOOLEAN
);
CREATE TABLE dwh_datamart.dm_weather (
    key_weather INTEGER, apparent_temperature_category VARCHAR
);
CREATE TABLE dwh_datamart.dm_weather_dt (
    key_weather INTEGER, is_rainy BOOLEAN, is_snowy BOOLEAN, rain_intensity VARCHAR,
    wind_intensity VARCHAR, snow_intensity VARCHAR, temperature_category VARCHAR
);
CREATE TABLE dwh_datamart.dm_vendor (key_vendor INTEGER, vendor_name VARCHAR);
CREATE TABLE dwh_datamart.dm_fact_taxi_trip (
    key_date_pickup INTEGER, key_date_dropoff INTEGER,
    key_zone_pickup INTEGER, key_zone_dropoff INTEGER,
    key_weather INTEGER, key_vendor INTEGER, key_ratecode INTEGER,
    total_amount DOUBLE, tip_amount DOUBLE, trip_distance DOUBLE,
    trip_duration_minutes DOUBLE, airport_fee DOUBLE
);
"#;

// Astoria has a historical zone version that must never be counted.
// Hot weather exists in the dimension but has no trips.
// 2024-04-01 sits exactly on the default range end.
const DATA: &str = r#"
INSERT INTO dwh_datamart.dm_date VALUES
    (20240101, DATE '2024-01-01', 2024, 'january', 'Monday', FALSE, 'winter', TRUE, 'New Year''s Day'),
    (20240105, DATE '2024-01-05', 2024, 'january', 'Friday', FALSE, 'winter', FALSE, NULL),
    (20240106, DATE '2024-01-06', 2024, 'january', 'Saturday', TRUE, 'winter', FALSE, NULL),
    (20240401, DATE '2024-04-01', 2024, 'april', 'Monday', FALSE, 'spring', FALSE, NULL),
    (20241225, DATE '2024-12-25', 2024, 'december', 'Wednesday', FALSE, 'winter', TRUE, 'Christmas Day');

INSERT INTO dwh_datamart.dm_zone VALUES
    (1, 'Astoria (old)', 'Queens', FALSE),
    (1, 'Astoria', 'Queens', TRUE),
    (2, 'Midtown', 'Manhattan', TRUE),
    (3, 'JFK Airport', 'Queens', TRUE);

INSERT INTO dwh_datamart.dm_weather VALUES
    (1, 'Cold'), (2, 'Mild'), (3, 'Hot');

INSERT INTO dwh_datamart.dm_weather_dt VALUES
    (1, TRUE, FALSE, 'light', 'breezy', 'none', 'cold'),
    (2, FALSE, FALSE, 'none', 'calm', 'none', 'mild'),
    (3, FALSE, FALSE, 'none', 'calm', 'none', 'hot');

INSERT INTO dwh_datamart.dm_vendor VALUES (1, 'Creative Mobile'), (2, 'VeriFone');

INSERT INTO dwh_datamart.dm_fact_taxi_trip VALUES
    (20240105, 20240105, 1, 2, 1, 1, 1, 20.0, 2.0, 3.0, 10.0, 0.0),
    (20240105, 20240105, 2, 1, 1, 2, 1, 30.0, 3.0, 5.0, 15.0, 0.0),
    (20240106, 20240106, 3, 2, 2, 1, 1, 50.0, 5.0, 15.0, 40.0, 1.75),
    (20241225, 20241225, 1, 1, NULL, 2, 1, 10.0, 0.0, 1.0, 5.0, 0.0),
    (20240401, 20240401, 2, 2, 2, 1, 1, 100.0, 10.0, 2.0, 8.0, 0.0);
"#;

/// A populated mart; the directory lives as long as this value
pub struct TestMart {
    pub dir: TempDir,
    pub config: WarehouseConfig,
}

/// Build the sample mart, then run `adjust` against it before releasing the file
pub fn build_mart_with(adjust: &str) -> TestResult<TestMart> {
    let dir = tempdir()?;
    let config = WarehouseConfig::for_root(dir.path());
    {
        let conn = Connection::open(config.db_path())?;
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch(DATA)?;
        if !adjust.is_empty() {
            conn.execute_batch(adjust)?;
        }
    }
    Ok(TestMart { dir, config })
}

pub fn build_mart() -> TestResult<TestMart> {
    build_mart_with("")
}
