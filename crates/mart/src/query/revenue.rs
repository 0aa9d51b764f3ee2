// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Revenue aggregates by vendor and calendar

use chrono::NaiveDate;
use duckdb::types::Value;
use serde::Serialize;

use super::params::YearMonth;
use super::{
    ColumnDef, ColumnRef, ColumnType, MartQuery, MartTable, MartTables, columns_of, get_date,
};
use crate::error::Result;

/// Average trip revenue per vendor
#[derive(Clone, Copy, Debug, Default)]
pub struct AvgRevenueByVendor;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VendorRevenue {
    pub vendor_name: Option<String>,
    pub avg_revenue: Option<f64>,
}

const VENDOR_REVENUE: &[ColumnDef] = &[
    ColumnDef::nullable("vendor_name", ColumnType::Text),
    ColumnDef::nullable("avg_revenue", ColumnType::Float64),
];

impl MartQuery for AvgRevenueByVendor {
    type Row = VendorRevenue;

    fn name(&self) -> &'static str {
        "avg_revenue_by_vendor"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        VENDOR_REVENUE
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "SELECT
    CAST(v.vendor_name AS VARCHAR) AS vendor_name,
    CAST(AVG(f.total_amount) AS DOUBLE) AS avg_revenue
FROM {fact} f
JOIN {vendor} v
    ON f.key_vendor = v.key_vendor
GROUP BY v.vendor_name
ORDER BY avg_revenue DESC",
            fact = t.fact,
            vendor = t.vendor,
        ))
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(MartTable::FactTaxiTrip, &["key_vendor", "total_amount"]),
            columns_of(MartTable::Vendor, &["key_vendor", "vendor_name"]),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<VendorRevenue> {
        Ok(VendorRevenue {
            vendor_name: row.get(0)?,
            avg_revenue: row.get(1)?,
        })
    }
}

/// Every day of a month whose pickup revenue equals the month's maximum.
///
/// Ties all come back, ordered by date.
#[derive(Clone, Copy, Debug)]
pub struct MaxDailyRevenue {
    pub month: YearMonth,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub daily_revenue: f64,
}

const DAILY_REVENUE: &[ColumnDef] = &[
    ColumnDef::new("date", ColumnType::Date),
    ColumnDef::new("daily_revenue", ColumnType::Float64),
];

impl MartQuery for MaxDailyRevenue {
    type Row = DailyRevenue;

    fn name(&self) -> &'static str {
        "max_daily_revenue"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        DAILY_REVENUE
    }

    // The maximum is taken over the already-computed per-day sums, so the
    // equality test compares identical values.
    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "WITH daily AS (
    SELECT
        CAST(d.date AS DATE) AS day,
        CAST(SUM(f.total_amount) AS DOUBLE) AS daily_revenue
    FROM {fact} f
    JOIN {date} d
        ON f.key_date_pickup = d.key_date
    WHERE d.year = ?
      AND lower(CAST(d.month_name AS VARCHAR)) = ?
    GROUP BY CAST(d.date AS DATE)
),
ranked AS (
    SELECT day, daily_revenue, MAX(daily_revenue) OVER () AS top_revenue
    FROM daily
)
SELECT
    strftime(day, '%Y-%m-%d') AS date,
    daily_revenue
FROM ranked
WHERE daily_revenue = top_revenue
ORDER BY day",
            fact = t.fact,
            date = t.date,
        ))
    }

    fn params(&self) -> Vec<Value> {
        vec![Value::Int(self.month.year), Value::Text(self.month.month_name())]
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(MartTable::FactTaxiTrip, &["key_date_pickup", "total_amount"]),
            columns_of(MartTable::Date, &["key_date", "date", "year", "month_name"]),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<DailyRevenue> {
        Ok(DailyRevenue {
            date: get_date(row, 0)?,
            daily_revenue: row.get(1)?,
        })
    }
}

/// Pickup revenue per calendar month
#[derive(Clone, Copy, Debug, Default)]
pub struct RevenueByYearMonth;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month_num: i32,
    pub month_name: Option<String>,
    pub revenue: Option<f64>,
}

const MONTHLY_REVENUE: &[ColumnDef] = &[
    ColumnDef::new("year", ColumnType::Int32),
    ColumnDef::new("month_num", ColumnType::Int32),
    ColumnDef::nullable("month_name", ColumnType::Text),
    ColumnDef::nullable("revenue", ColumnType::Float64),
];

impl MartQuery for RevenueByYearMonth {
    type Row = MonthlyRevenue;

    fn name(&self) -> &'static str {
        "revenue_by_year_month"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        MONTHLY_REVENUE
    }

    fn sql(&self, t: &MartTables) -> Result<String> {
        Ok(format!(
            "SELECT
    CAST(d.year AS INTEGER) AS year,
    CAST(EXTRACT(MONTH FROM d.date) AS INTEGER) AS month_num,
    CAST(d.month_name AS VARCHAR) AS month_name,
    CAST(SUM(f.total_amount) AS DOUBLE) AS revenue
FROM {fact} f
JOIN {date} d
    ON f.key_date_pickup = d.key_date
GROUP BY d.year, EXTRACT(MONTH FROM d.date), d.month_name
ORDER BY 1, 2",
            fact = t.fact,
            date = t.date,
        ))
    }

    fn required_columns(&self) -> Vec<ColumnRef> {
        [
            columns_of(MartTable::FactTaxiTrip, &["key_date_pickup", "total_amount"]),
            columns_of(MartTable::Date, &["key_date", "date", "year", "month_name"]),
        ]
        .concat()
    }

    fn read_row(&self, row: &duckdb::Row<'_>) -> duckdb::Result<MonthlyRevenue> {
        Ok(MonthlyRevenue {
            year: row.get(0)?,
            month_num: row.get(1)?,
            month_name: row.get(2)?,
            revenue: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Ident;
    use chrono::Month;

    #[test]
    fn test_max_daily_revenue_binds_calendar() -> Result<()> {
        let q = MaxDailyRevenue {
            month: YearMonth::new(2025, Month::January),
        };
        assert_eq!(
            q.params(),
            vec![Value::Int(2025), Value::Text("january".to_string())]
        );
        let sql = q.sql(&MartTables::new(&Ident::new("m")?)?)?;
        assert!(sql.contains("WHERE daily_revenue = top_revenue"));
        assert!(!sql.contains("LIMIT"));
        Ok(())
    }
}
