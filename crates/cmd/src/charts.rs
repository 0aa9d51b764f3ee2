// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Chart presets for each catalogue query

use mart::query::{
    BoroughDistance, BoroughSeasonTemperatureRow, DailyRevenue, HeatmapMetric, HolidayTrips,
    MonthlyRevenue, NeighborhoodTrips, Side, TemperatureTrips, TipRate, VendorRevenue,
    WeatherAttribute, WeatherFlag, WeatherFlagRow, WeatherIntensityRow, WeatherMultidimRow,
    YearMonth,
};
use mart::{ChartKind, ChartSpec, QueryResult, Result};

pub const RAIN_ORDER: &[&str] = &["No Rain", "Light Rain", "Moderate Rain", "Heavy Rain"];

pub const WIND_ORDER: &[&str] = &[
    "No Wind",
    "Light Wind",
    "Moderate Wind",
    "Strong Wind",
    "Very Strong Wind",
];

pub const SNOW_ORDER: &[&str] = &["No Snow", "Light Snow", "Moderate Snow", "Heavy Snow"];

pub const TEMPERATURE_ORDER: &[&str] = &[
    "Extreme Cold",
    "Freezing",
    "Cold",
    "Mild",
    "Warm",
    "Hot",
    "Extreme Heat",
];

/// Display order of an attribute's categories, coldest or calmest first
#[must_use]
pub fn attribute_order(attribute: WeatherAttribute) -> &'static [&'static str] {
    match attribute {
        WeatherAttribute::RainIntensity => RAIN_ORDER,
        WeatherAttribute::WindIntensity => WIND_ORDER,
        WeatherAttribute::SnowIntensity => SNOW_ORDER,
        WeatherAttribute::TemperatureCategory => TEMPERATURE_ORDER,
    }
}

fn attribute_title(attribute: WeatherAttribute) -> &'static str {
    match attribute {
        WeatherAttribute::RainIntensity => "rain intensity",
        WeatherAttribute::WindIntensity => "wind intensity",
        WeatherAttribute::SnowIntensity => "snow intensity",
        WeatherAttribute::TemperatureCategory => "temperature intensity",
    }
}

pub fn weather_multidim(result: &QueryResult<WeatherMultidimRow>) -> Result<ChartSpec> {
    ChartSpec::new(ChartKind::Bar, result)?
        .x("pickup_borough")
        .y("total_revenue")
        .color("day_name")
        .facet("season")
        .title("Revenue by pickup borough, weekday and season")
        .axis_titles("Pickup borough", "Total revenue")
        .build()
}

/// Top neighborhoods; the dropoff view shows more rows by default
pub fn trips_by_neighborhood(
    result: &QueryResult<NeighborhoodTrips>,
    side: Side,
    top: Option<u32>,
) -> Result<ChartSpec> {
    let default_top = match side {
        Side::Pickup => 10,
        Side::Dropoff => 20,
    };
    ChartSpec::new(ChartKind::HorizontalBar, result)?
        .label("label", &["neighborhood_name", "borough_name"], "{} ({})")
        .x("total_trips")
        .y("label")
        .top(top.map_or(default_top, |n| n as usize))
        .title(&format!("Top {} neighborhoods by total trips", side.label()))
        .axis_titles("Total trips", "")
        .build()
}

pub fn avg_revenue_by_vendor(result: &QueryResult<VendorRevenue>) -> Result<ChartSpec> {
    ChartSpec::new(ChartKind::Bar, result)?
        .x("vendor_name")
        .y("avg_revenue")
        .title("Average revenue by vendor")
        .axis_titles("Vendor", "Avg revenue")
        .build()
}

pub fn trips_by_apparent_temperature(result: &QueryResult<TemperatureTrips>) -> Result<ChartSpec> {
    ChartSpec::new(ChartKind::Bar, result)?
        .x("apparent_temperature_category")
        .y("total_trips")
        .category_order("apparent_temperature_category", TEMPERATURE_ORDER)
        .title("Trips by apparent temperature category")
        .axis_titles("Apparent temperature category", "Total trips")
        .build()
}

pub fn max_daily_revenue(result: &QueryResult<DailyRevenue>, month: YearMonth) -> Result<ChartSpec> {
    ChartSpec::new(ChartKind::Bar, result)?
        .x("date")
        .y("daily_revenue")
        .title(&format!("Max daily revenue - {month}"))
        .axis_titles("Date", "Revenue")
        .build()
}

/// One line per year, months in calendar order
pub fn revenue_by_year_month(result: &QueryResult<MonthlyRevenue>) -> Result<ChartSpec> {
    let mut months: Vec<(i32, &str)> = result
        .rows
        .iter()
        .filter_map(|r| r.month_name.as_deref().map(|name| (r.month_num, name)))
        .collect();
    months.sort_unstable();
    months.dedup();
    let order: Vec<&str> = months.into_iter().map(|(_, name)| name).collect();

    ChartSpec::new(ChartKind::Line, result)?
        .x("month_name")
        .y("revenue")
        .color("year")
        .category_order("month_name", &order)
        .title("Revenue by year and month")
        .axis_titles("Month", "Revenue")
        .build()
}

pub fn holiday_trips(
    result: &QueryResult<HolidayTrips>,
    holiday: &str,
    side: Side,
    top: Option<u32>,
) -> Result<ChartSpec> {
    ChartSpec::new(ChartKind::HorizontalBar, result)?
        .x("trips")
        .y("neighborhood_name")
        .top(top.map_or(10, |n| n as usize))
        .title(&format!("{holiday} - top {} neighborhoods by trips", side.label()))
        .axis_titles("Trips", "")
        .build()
}

pub fn borough_season_temperature(
    result: &QueryResult<BoroughSeasonTemperatureRow>,
    metric: HeatmapMetric,
) -> Result<ChartSpec> {
    ChartSpec::new(ChartKind::Heatmap, result)?
        .x("apparent_temperature_category")
        .y("pickup_borough")
        .z(metric.column())
        .facet("season")
        .category_order("apparent_temperature_category", TEMPERATURE_ORDER)
        .title(&format!("Pickup borough x season x temp category ({metric})"))
        .build()
}

pub fn tip_rate(result: &QueryResult<TipRate>) -> Result<ChartSpec> {
    ChartSpec::new(ChartKind::Bar, result)?
        .x("apparent_temperature_category")
        .y("tip_rate")
        .title("Tip rate by apparent temperature category")
        .axis_titles("Apparent temperature category", "Tip rate (tips / total)")
        .build()
}

pub fn weather_flag(
    result: &QueryResult<WeatherFlagRow>,
    flag: WeatherFlag,
    by_borough: bool,
) -> Result<ChartSpec> {
    let noun = flag.noun();
    let (set, unset) = flag.labels();
    let chart = ChartSpec::new(ChartKind::Bar, result)?
        .value_labels("condition", "flag_value", &[("true", set), ("false", unset)])
        .y("trips_per_weather");
    if by_borough {
        chart
            .x("borough")
            .color("condition")
            .log_y()
            .title(&format!(
                "Avg taxi trips per weather record by borough ({noun} vs no {noun})"
            ))
            .axis_titles("Borough", "Avg taxi trips per weather record")
            .build()
    } else {
        chart
            .x("condition")
            .title(&format!("Avg taxi trips per weather record ({noun} vs no {noun})"))
            .axis_titles("", "Trips per weather record")
            .build()
    }
}

pub fn weather_intensity(
    result: &QueryResult<WeatherIntensityRow>,
    attribute: WeatherAttribute,
    by_borough: bool,
) -> Result<ChartSpec> {
    let what = attribute_title(attribute);
    let chart = ChartSpec::new(ChartKind::Bar, result)?
        .y("trips_per_category")
        .category_order("intensity", attribute_order(attribute));
    if by_borough {
        chart
            .x("borough")
            .color("intensity")
            .log_y()
            .title(&format!(
                "Avg taxi trips per weather record by {what} and borough"
            ))
            .axis_titles("Borough", "Avg taxi trips per weather record")
            .build()
    } else {
        chart
            .x("intensity")
            .title(&format!("Avg taxi trips per weather record by {what}"))
            .axis_titles("", "Trips per weather record")
            .build()
    }
}

pub fn avg_trip_distance(result: &QueryResult<BoroughDistance>) -> Result<ChartSpec> {
    ChartSpec::new(ChartKind::Bar, result)?
        .x("borough")
        .y("avg_trip_distance")
        .title("Avg trip distance by borough (no airport trips)")
        .axis_titles("Borough", "Avg trip distance (miles or km)")
        .build()
}
