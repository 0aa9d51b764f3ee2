// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use mart::query::{
    AvgRevenueByVendor, AvgTripDistanceByBorough, BoroughSeasonTemperature, CHRISTMAS_DAY,
    DateRange, HeatmapMetric, HolidayTripsByNeighborhood, MaxDailyRevenue, RevenueByYearMonth,
    Side, TipRateByTemperature, TripsByApparentTemperature, TripsByNeighborhood,
    WeatherAttribute, WeatherFlag, WeatherFlagRate, WeatherIntensityRate, WeatherMultidim,
    YearMonth,
};
use mart::{ChartSpec, Facade, MartQuery, QueryResult};

use crate::charts;
use crate::common::TaxiContext;
use crate::output::{OutputFormat, write_result};

/// Catalogue queries by command-line name
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QueryName {
    WeatherMultidim,
    TripsByNeighborhood,
    AvgRevenueByVendor,
    TripsByApparentTemperature,
    MaxDailyRevenue,
    RevenueByYearMonth,
    HolidayTripsByNeighborhood,
    BoroughSeasonTemperature,
    TipRateByTemperature,
    WeatherFlagRate,
    WeatherIntensityRate,
    AvgTripDistanceByBorough,
}

#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Query to run
    #[arg(value_enum)]
    pub query: QueryName,

    /// First day of the date range (inclusive, YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Day after the date range (exclusive, YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Year for max-daily-revenue
    #[arg(long, default_value_t = 2025)]
    pub year: i32,

    /// Month name or number for max-daily-revenue
    #[arg(long, default_value = "january")]
    pub month: String,

    /// Trip end for neighborhood queries: pickup or dropoff
    #[arg(long, default_value = "pickup")]
    pub side: String,

    /// Maximum number of neighborhoods
    #[arg(long)]
    pub limit: Option<u32>,

    /// Holiday name as stored in dm_date
    #[arg(long, default_value = CHRISTMAS_DAY)]
    pub holiday: String,

    /// Weather flag: rainy or snowy
    #[arg(long, default_value = "rainy")]
    pub flag: String,

    /// Weather attribute: rain_intensity, wind_intensity, snow_intensity, temperature_category
    #[arg(long, default_value = "rain_intensity")]
    pub attribute: String,

    /// Split weather rates by pickup borough
    #[arg(long)]
    pub by_borough: bool,

    /// Heatmap metric: total_trips, total_revenue or avg_fare
    #[arg(long, default_value = "total_revenue")]
    pub metric: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl QueryArgs {
    /// Arguments for `query` with every option at its default
    #[must_use]
    pub fn new(query: QueryName) -> Self {
        Self {
            query,
            start: None,
            end: None,
            year: 2025,
            month: "january".to_string(),
            side: "pickup".to_string(),
            limit: None,
            holiday: CHRISTMAS_DAY.to_string(),
            flag: "rainy".to_string(),
            attribute: "rain_intensity".to_string(),
            by_borough: false,
            metric: "total_revenue".to_string(),
            format: OutputFormat::Table,
        }
    }

    fn range(&self) -> Result<DateRange> {
        match (self.start, self.end) {
            (None, None) => Ok(DateRange::default()),
            (Some(start), Some(end)) => Ok(DateRange::new(start, end)?),
            _ => Err(anyhow!("--start and --end must be given together")),
        }
    }

    fn side(&self) -> Result<Side> {
        Ok(self.side.parse()?)
    }
}

fn render<Q, F>(
    facade: &Facade,
    query: &Q,
    format: OutputFormat,
    out: &mut dyn Write,
    chart: F,
) -> Result<()>
where
    Q: MartQuery,
    F: FnOnce(&QueryResult<Q::Row>) -> mart::Result<ChartSpec>,
{
    let name = query.name();
    let result = facade
        .run(query)
        .with_context(|| format!("Query {name} failed"))?;
    write_result(out, &result, format, chart)
}

/// Run one catalogue query against the mart and print its result
pub fn query_command(ctx: &TaxiContext, args: &QueryArgs, out: &mut dyn Write) -> Result<()> {
    let config = ctx.load_config()?;
    let facade = Facade::open(&config)?;
    let format = args.format;

    match args.query {
        QueryName::WeatherMultidim => {
            let q = WeatherMultidim {
                range: args.range()?,
            };
            render(&facade, &q, format, out, charts::weather_multidim)
        }
        QueryName::TripsByNeighborhood => {
            let side = args.side()?;
            let q = TripsByNeighborhood {
                side,
                limit: args.limit,
            };
            render(&facade, &q, format, out, |r| {
                charts::trips_by_neighborhood(r, side, args.limit)
            })
        }
        QueryName::AvgRevenueByVendor => {
            render(&facade, &AvgRevenueByVendor, format, out, charts::avg_revenue_by_vendor)
        }
        QueryName::TripsByApparentTemperature => render(
            &facade,
            &TripsByApparentTemperature,
            format,
            out,
            charts::trips_by_apparent_temperature,
        ),
        QueryName::MaxDailyRevenue => {
            let month = YearMonth::parse(args.year, &args.month)?;
            let q = MaxDailyRevenue { month };
            render(&facade, &q, format, out, |r| {
                charts::max_daily_revenue(r, month)
            })
        }
        QueryName::RevenueByYearMonth => {
            render(&facade, &RevenueByYearMonth, format, out, charts::revenue_by_year_month)
        }
        QueryName::HolidayTripsByNeighborhood => {
            let side = args.side()?;
            let q = HolidayTripsByNeighborhood {
                holiday: args.holiday.clone(),
                side,
                limit: args.limit,
            };
            render(&facade, &q, format, out, |r| {
                charts::holiday_trips(r, &args.holiday, side, args.limit)
            })
        }
        QueryName::BoroughSeasonTemperature => {
            let metric: HeatmapMetric = args.metric.parse()?;
            let q = BoroughSeasonTemperature {
                range: args.range()?,
            };
            render(&facade, &q, format, out, |r| {
                charts::borough_season_temperature(r, metric)
            })
        }
        QueryName::TipRateByTemperature => {
            let q = TipRateByTemperature {
                range: args.range()?,
            };
            render(&facade, &q, format, out, charts::tip_rate)
        }
        QueryName::WeatherFlagRate => {
            let flag: WeatherFlag = args.flag.parse()?;
            let q = WeatherFlagRate {
                flag,
                by_borough: args.by_borough,
            };
            render(&facade, &q, format, out, |r| {
                charts::weather_flag(r, flag, args.by_borough)
            })
        }
        QueryName::WeatherIntensityRate => {
            let attribute: WeatherAttribute = args.attribute.parse()?;
            let q = WeatherIntensityRate {
                attribute,
                by_borough: args.by_borough,
            };
            render(&facade, &q, format, out, |r| {
                charts::weather_intensity(r, attribute, args.by_borough)
            })
        }
        QueryName::AvgTripDistanceByBorough => render(
            &facade,
            &AvgTripDistanceByBorough,
            format,
            out,
            charts::avg_trip_distance,
        ),
    }
}
