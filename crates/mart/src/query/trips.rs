// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Trip counts and distances by zone

use duckdb::types::Value;
use serde::Serialize;

use super::params::{Side, limit_clause};
use super::{
    ColumnDef, ColumnRef, ColumnType, MartQuery, MartTable, MartTables, ZONE_COLUMNS, columns_of,
};
use crate::error::Result;

/// Holiday used by the seasonal neighborhood slices
pub const CHRISTMAS_DAY: &str = "Christmas Day";

/// Trip counts per neighborhood, at the pickup or dropoff end
#[derive(Clone, Debug, Default)]
pub struct TripsByNeighborhood {
    pub side: Side,
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NeighborhoodTrips {
    pub neighborhood_name: Option<String>,
    pub borough_name: Option<String>,
    pub total_trips: i64,
}

const NEIGHBORHOOD_TRIPS: &[ColumnDef] = &[
    ColumnDef::nullable("neighborhood_name", ColumnType::Text),
    ColumnDef::nullable("borough_name", ColumnType::Text),
    ColumnDef::new("total_trips", ColumnType::Int64),
];

impl MartQuery for TripsByNeighborhood {
    type Row = NeighborhoodTrips;

    fn name(&self) -> &'static str {
        match self.side {
            Side::Pickup => "trips_by_pickup_neighborhood",
            Side::Dropoff => "trips_by_dropoff_neighborhood",
        }
    }

    fn columns(&self) -> &'static [ColumnDef] {
        NEIGHBORHOOD_TRIPS
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "SELECT
    CAST(z.neighborhood_name AS VARCHAR) AS neighborhood_name,
    CAST(z.borough_name AS VARCHAR) AS borough_name,
    COUNT(*) AS total_trips
FROM {fact} f
JOIN {zone} z
    ON f.{zone_key} = z.key_zone
    AND z.is_current = TRUE
GROUP BY z.neighborhood_name, z.borough_name
ORDER BY total_trips DESC{limit}",
            fact = t.fact,
            zone = t.zone,
            zone_key = self.side.zone_key(),
            limit = limit_clause(self.limit),
        ))
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(MartTable::FactTaxiTrip, &[self.side.zone_key()]),
            columns_of(MartTable::Zone, ZONE_COLUMNS),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<NeighborhoodTrips> {
        Ok(NeighborhoodTrips {
            neighborhood_name: row.get(0)?,
            borough_name: row.get(1)?,
            total_trips: row.get(2)?,
        })
    }
}

/// Trip counts per neighborhood on a named holiday
#[derive(Clone, Debug)]
pub struct HolidayTripsByNeighborhood {
    pub holiday: String,
    pub side: Side,
    pub limit: Option<u32>,
}

impl Default for HolidayTripsByNeighborhood {
    fn default() -> Self {
        Self {
            holiday: CHRISTMAS_DAY.to_string(),
            side: Side::Pickup,
            limit: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HolidayTrips {
    pub neighborhood_name: Option<String>,
    pub trips: i64,
}

const HOLIDAY_TRIPS: &[ColumnDef] = &[
    ColumnDef::nullable("neighborhood_name", ColumnType::Text),
    ColumnDef::new("trips", ColumnType::Int64),
];

impl MartQuery for HolidayTripsByNeighborhood {
    type Row = HolidayTrips;

    fn name(&self) -> &'static str {
        match self.side {
            Side::Pickup => "holiday_trips_by_pickup_neighborhood",
            Side::Dropoff => "holiday_trips_by_dropoff_neighborhood",
        }
    }

    fn columns(&self) -> &'static [ColumnDef] {
        HOLIDAY_TRIPS
    }

    // The date join follows the same trip end as the zone join.
    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "SELECT
    CAST(z.neighborhood_name AS VARCHAR) AS neighborhood_name,
    COUNT(*) AS trips
FROM {fact} f
JOIN {date} d
    ON f.{date_key} = d.key_date
JOIN {zone} z
    ON f.{zone_key} = z.key_zone
    AND z.is_current = TRUE
WHERE d.is_holiday IS TRUE
  AND d.holiday_name = ?
GROUP BY z.neighborhood_name
ORDER BY trips DESC{limit}",
            fact = t.fact,
            date = t.date,
            zone = t.zone,
            date_key = self.side.date_key(),
            zone_key = self.side.zone_key(),
            limit = limit_clause(self.limit),
        ))
    }

    fn params(&self) -> Vec<Value> {
        vec![Value::Text(self.holiday.clone())]
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(
                MartTable::FactTaxiTrip,
                &[self.side.date_key(), self.side.zone_key()],
            ),
            columns_of(MartTable::Date, &["key_date", "is_holiday", "holiday_name"]),
            columns_of(MartTable::Zone, ZONE_COLUMNS),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<HolidayTrips> {
        Ok(HolidayTrips {
            neighborhood_name: row.get(0)?,
            trips: row.get(1)?,
        })
    }
}

/// Average trip distance per pickup borough, excluding airport trips
#[derive(Clone, Copy, Debug, Default)]
pub struct AvgTripDistanceByBorough;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoroughDistance {
    pub borough: Option<String>,
    pub avg_trip_distance: Option<f64>,
}

const BOROUGH_DISTANCE: &[ColumnDef] = &[
    ColumnDef::nullable("borough", ColumnType::Text),
    ColumnDef::nullable("avg_trip_distance", ColumnType::Float64),
];

impl MartQuery for AvgTripDistanceByBorough {
    type Row = BoroughDistance;

    fn name(&self) -> &'static str {
        "avg_trip_distance_by_borough"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        BOROUGH_DISTANCE
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "SELECT
    CAST(z.borough_name AS VARCHAR) AS borough,
    CAST(AVG(f.trip_distance) AS DOUBLE) AS avg_trip_distance
FROM {fact} f
JOIN {zone} z
    ON f.key_zone_pickup = z.key_zone
    AND z.is_current = TRUE
WHERE f.airport_fee = 0
GROUP BY z.borough_name
ORDER BY borough",
            fact = t.fact,
            zone = t.zone,
        ))
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(
                MartTable::FactTaxiTrip,
                &["key_zone_pickup", "trip_distance", "airport_fee"],
            ),
            columns_of(MartTable::Zone, ZONE_COLUMNS),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<BoroughDistance> {
        Ok(BoroughDistance {
            borough: row.get(0)?,
            avg_trip_distance: row.get(1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Ident;

    fn tables() -> MartTables {
        MartTables::new(&Ident::new("dwh_datamart").expect("ident")).expect("tables")
    }

    #[test]
    fn test_zone_join_is_current_only() -> Result<()> {
        let q = TripsByNeighborhood {
            side: Side::Dropoff,
            limit: Some(20),
        };
        let sql = q.sql(&tables())?;
        assert!(sql.contains("f.key_zone_dropoff = z.key_zone"));
        assert!(sql.contains("z.is_current = TRUE"));
        assert!(sql.ends_with("LIMIT 20"));
        assert_eq!(q.name(), "trips_by_dropoff_neighborhood");
        Ok(())
    }

    #[test]
    fn test_holiday_binds_name() -> Result<()> {
        let q = HolidayTripsByNeighborhood {
            side: Side::Dropoff,
            ..Default::default()
        };
        let sql = q.sql(&tables())?;
        assert!(sql.contains("f.key_date_dropoff = d.key_date"));
        assert!(!sql.contains(CHRISTMAS_DAY));
        assert_eq!(q.params(), vec![Value::Text(CHRISTMAS_DAY.to_string())]);
        Ok(())
    }
}
