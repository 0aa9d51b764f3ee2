// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Raw view registration over scratch CSV and Parquet files

mod common;

use std::fs;
use std::path::Path;

use common::TestResult;
use duckdb::Connection;
use mart::source::{Discriminator, UnionBranch};
use mart::{Error, Ident, Registrar, SourceSpec, ViewDefinition, WarehouseConfig};
use tempfile::tempdir;

/// Write a weather export with three metadata lines above the header
fn write_weather(dir: &Path, name: &str, header: &str, rows: &[&str]) -> TestResult {
    fs::create_dir_all(dir)?;
    let mut text = String::from("# exported by station\nlatitude,longitude\n40.8,-73.9\n");
    text.push_str(header);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    fs::write(dir.join(name), text)?;
    Ok(())
}

fn branch(dir: &Path, borough: &str) -> TestResult<UnionBranch> {
    Ok(UnionBranch {
        pattern: format!("{}/*.csv", dir.display()),
        header: true,
        skip: 3,
        discriminator: Some(Discriminator {
            column: Ident::new("borough_name")?,
            value: borough.to_string(),
        }),
    })
}

fn weather_view(data: &Path) -> TestResult<ViewDefinition> {
    Ok(ViewDefinition {
        name: Ident::new("weather")?,
        source: SourceSpec::CsvUnion {
            branches: vec![
                branch(&data.join("Weather_Bronx"), "Bronx")?,
                branch(&data.join("Weather_StatenIsland"), "Staten Island")?,
            ],
        },
    })
}

fn setup_weather(data: &Path) -> TestResult {
    write_weather(
        &data.join("Weather_Bronx"),
        "2024.csv",
        "time,temperature",
        &["2024-01-01T00:00,1.5", "2024-01-01T01:00,1.0"],
    )?;
    write_weather(
        &data.join("Weather_StatenIsland"),
        "2024.csv",
        "time,temperature",
        &["2024-01-01T00:00,2.5"],
    )
}

fn collect_pairs(conn: &Connection, sql: &str) -> TestResult<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[test]
fn test_union_discriminator_per_branch() -> TestResult {
    let tmp = tempdir()?;
    setup_weather(tmp.path())?;

    let conn = Connection::open_in_memory()?;
    let registrar = Registrar::new(&conn, Ident::new("raw")?);
    registrar.ensure_schema()?;
    registrar.register(&weather_view(tmp.path())?)?;

    let counts = collect_pairs(
        &conn,
        "SELECT borough_name, COUNT(*) FROM raw.weather GROUP BY 1 ORDER BY 1",
    )?;
    assert_eq!(
        counts,
        vec![("Bronx".to_string(), 2), ("Staten Island".to_string(), 1)]
    );

    // Discriminator first, then the columns under the skipped metadata
    let columns = registrar.probe("SELECT * FROM raw.weather")?;
    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["borough_name", "time", "temperature"]);
    Ok(())
}

#[test]
fn test_reregistering_is_idempotent() -> TestResult {
    let tmp = tempdir()?;
    setup_weather(tmp.path())?;
    let view = weather_view(tmp.path())?;

    let conn = Connection::open_in_memory()?;
    let registrar = Registrar::new(&conn, Ident::new("raw")?);
    registrar.ensure_schema()?;

    let query = "SELECT borough_name, CAST(temperature * 10 AS BIGINT) FROM raw.weather ORDER BY 1, 2";
    registrar.register(&view)?;
    let first = collect_pairs(&conn, query)?;
    registrar.register(&view)?;
    let second = collect_pairs(&conn, query)?;

    assert_eq!(first, second);
    assert_eq!(registrar.list_views()?, vec!["weather".to_string()]);
    Ok(())
}

#[test]
fn test_union_column_mismatch_creates_nothing() -> TestResult {
    let tmp = tempdir()?;
    let data = tmp.path();
    write_weather(
        &data.join("Weather_Bronx"),
        "2024.csv",
        "time,temperature",
        &["2024-01-01T00:00,1.5"],
    )?;
    write_weather(
        &data.join("Weather_StatenIsland"),
        "2024.csv",
        "time,temperature,humidity",
        &["2024-01-01T00:00,2.5,80"],
    )?;

    let conn = Connection::open_in_memory()?;
    let registrar = Registrar::new(&conn, Ident::new("raw")?);
    registrar.ensure_schema()?;

    match registrar.register(&weather_view(data)?) {
        Err(Error::SchemaMismatch { view, .. }) => assert_eq!(view, "weather"),
        other => panic!("unexpected result {other:?}"),
    }
    assert!(registrar.list_views()?.is_empty());
    Ok(())
}

#[test]
fn test_union_with_empty_column_in_one_branch() -> TestResult {
    let tmp = tempdir()?;
    let data = tmp.path();
    write_weather(
        &data.join("Weather_Bronx"),
        "2024.csv",
        "time,temperature,snow",
        &["2024-01-01T00:00,1.5,", "2024-01-01T01:00,1.0,"],
    )?;
    write_weather(
        &data.join("Weather_StatenIsland"),
        "2024.csv",
        "time,temperature,snow",
        &["2024-01-01T00:00,2.5,0.5", "2024-01-01T01:00,2.0,0.0"],
    )?;

    let conn = Connection::open_in_memory()?;
    let registrar = Registrar::new(&conn, Ident::new("raw")?);
    registrar.ensure_schema()?;
    registrar.register(&weather_view(data)?)?;

    let counts = collect_pairs(
        &conn,
        "SELECT borough_name, COUNT(*) FROM raw.weather GROUP BY 1 ORDER BY 1",
    )?;
    assert_eq!(
        counts,
        vec![("Bronx".to_string(), 2), ("Staten Island".to_string(), 2)]
    );
    let snow: f64 = conn.query_row(
        "SELECT SUM(CAST(snow AS DOUBLE)) FROM raw.weather WHERE borough_name = 'Staten Island'",
        [],
        |row| row.get(0),
    )?;
    assert!((snow - 0.5).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_empty_glob_is_source_not_found() -> TestResult {
    let tmp = tempdir()?;
    fs::create_dir_all(tmp.path().join("taxi_trip"))?;
    let pattern = format!("{}/taxi_trip/*.parquet", tmp.path().display());

    let conn = Connection::open_in_memory()?;
    let registrar = Registrar::new(&conn, Ident::new("raw")?);
    registrar.ensure_schema()?;

    let view = ViewDefinition {
        name: Ident::new("taxi_trip")?,
        source: SourceSpec::Parquet {
            pattern: pattern.clone(),
        },
    };
    match registrar.register(&view) {
        Err(Error::SourceNotFound { view, pattern: p }) => {
            assert_eq!(view, "taxi_trip");
            assert_eq!(p, pattern);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(registrar.list_views()?.is_empty());
    Ok(())
}

#[test]
fn test_parquet_glob() -> TestResult {
    let tmp = tempdir()?;
    let dir = tmp.path().join("taxi_trip");
    fs::create_dir_all(&dir)?;

    let conn = Connection::open_in_memory()?;
    for (month, trips) in [("01", 3), ("02", 4)] {
        let file = dir.join(format!("yellow_tripdata_2024-{month}.parquet"));
        conn.execute_batch(&format!(
            "COPY (SELECT range AS trip_id, 12.5 AS total_amount FROM range({trips})) \
             TO '{}' (FORMAT PARQUET);",
            file.display()
        ))?;
    }

    let registrar = Registrar::new(&conn, Ident::new("raw")?);
    registrar.ensure_schema()?;
    registrar.register(&ViewDefinition {
        name: Ident::new("taxi_trip")?,
        source: SourceSpec::Parquet {
            pattern: format!("{}/*.parquet", dir.display()),
        },
    })?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM raw.taxi_trip", [], |r| r.get(0))?;
    assert_eq!(count, 7);
    Ok(())
}

#[test]
fn test_initialize_from_yaml_catalogue() -> TestResult {
    let tmp = tempdir()?;
    let zones = tmp.path().join("data").join("zones");
    fs::create_dir_all(&zones)?;
    fs::write(
        zones.join("borough.csv"),
        "borough_id,borough_name\n1,Bronx\n2,Brooklyn\n",
    )?;

    let yaml = r#"
db_file: warehouse.duckdb
raw_schema: landing
views:
  - name: borough
    source:
      format: csv
      path: zones/borough.csv
"#;
    fs::write(tmp.path().join(mart::CONFIG_FILE), yaml)?;

    let config = WarehouseConfig::load(tmp.path())?;
    assert_eq!(mart::initialize(&config)?, 1);
    assert!(tmp.path().join("warehouse.duckdb").is_file());

    let conn = Connection::open(config.db_path())?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM landing.borough", [], |r| r.get(0))?;
    assert_eq!(count, 2);
    Ok(())
}
