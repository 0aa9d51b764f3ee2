// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Chart specifications
//!
//! Reshapes a query result into a declarative, serializable chart
//! description. Nothing is drawn and nothing is aggregated here: the
//! adapter only composes labels, orders categories and truncates.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::query::QueryResult;

type JsonRow = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    Line,
    Heatmap,
}

/// Column bindings per visual channel
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Bindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AxisTitles {
    pub x: Option<String>,
    pub y: Option<String>,
}

/// Display order for the values of one column
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryOrder {
    pub column: String,
    pub labels: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
struct Label {
    name: String,
    columns: Vec<String>,
    template: String,
    values: Vec<(String, String)>,
}

/// A finished chart description
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub bindings: Bindings,
    pub axis_titles: AxisTitles,
    pub log_y: bool,
    pub category_orders: Vec<CategoryOrder>,
    pub data: Vec<JsonRow>,
}

impl ChartSpec {
    /// Start a chart over the rows of `result`
    pub fn new<R: Serialize>(kind: ChartKind, result: &QueryResult<R>) -> Result<ChartBuilder> {
        Ok(ChartBuilder {
            kind,
            source: result.query.to_string(),
            columns: result.column_names().into_iter().map(String::from).collect(),
            rows: result.to_json_rows()?,
            title: None,
            bindings: Bindings::default(),
            axis_titles: AxisTitles::default(),
            log_y: false,
            labels: Vec::new(),
            category_orders: Vec::new(),
            top: None,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Accumulates bindings; validation happens in [`ChartBuilder::build`]
#[derive(Clone, Debug)]
pub struct ChartBuilder {
    kind: ChartKind,
    source: String,
    columns: Vec<String>,
    rows: Vec<JsonRow>,
    title: Option<String>,
    bindings: Bindings,
    axis_titles: AxisTitles,
    log_y: bool,
    labels: Vec<Label>,
    category_orders: Vec<CategoryOrder>,
    top: Option<usize>,
}

impl ChartBuilder {
    #[must_use]
    pub fn x(mut self, column: &str) -> Self {
        self.bindings.x = Some(column.to_string());
        self
    }

    #[must_use]
    pub fn y(mut self, column: &str) -> Self {
        self.bindings.y = Some(column.to_string());
        self
    }

    #[must_use]
    pub fn color(mut self, column: &str) -> Self {
        self.bindings.color = Some(column.to_string());
        self
    }

    #[must_use]
    pub fn facet(mut self, column: &str) -> Self {
        self.bindings.facet = Some(column.to_string());
        self
    }

    /// Cell value channel of a heatmap
    #[must_use]
    pub fn z(mut self, column: &str) -> Self {
        self.bindings.z = Some(column.to_string());
        self
    }

    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    #[must_use]
    pub fn axis_titles(mut self, x: &str, y: &str) -> Self {
        self.axis_titles = AxisTitles {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
        };
        self
    }

    #[must_use]
    pub fn log_y(mut self) -> Self {
        self.log_y = true;
        self
    }

    /// Add a column `name` composed from `columns`.
    ///
    /// Each `{}` in `template` takes the next column's value; NULL renders
    /// as an empty string.
    #[must_use]
    pub fn label(mut self, name: &str, columns: &[&str], template: &str) -> Self {
        self.labels.push(Label {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            template: template.to_string(),
            values: Vec::new(),
        });
        self
    }

    /// Add a column `name` holding a display label for each value of `column`.
    ///
    /// Values are matched in their rendered form (`true`, `42`, `Queens`);
    /// a value without a label is copied through unchanged.
    #[must_use]
    pub fn value_labels(mut self, name: &str, column: &str, labels: &[(&str, &str)]) -> Self {
        self.labels.push(Label {
            name: name.to_string(),
            columns: vec![column.to_string()],
            template: "{}".to_string(),
            values: labels
                .iter()
                .map(|(value, label)| (value.to_string(), label.to_string()))
                .collect(),
        });
        self
    }

    /// Display order for `column`; unlisted values follow in their original order
    #[must_use]
    pub fn category_order(mut self, column: &str, labels: &[&str]) -> Self {
        self.category_orders.push(CategoryOrder {
            column: column.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        });
        self
    }

    /// Keep only the first `n` rows as the query returned them
    #[must_use]
    pub fn top(mut self, n: usize) -> Self {
        self.top = Some(n);
        self
    }

    fn require(&self, column: &str) -> Result<()> {
        if self.columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(Error::column_not_found(self.source.clone(), column))
        }
    }

    pub fn build(mut self) -> Result<ChartSpec> {
        if let Some(n) = self.top {
            self.rows.truncate(n);
        }

        let labels = std::mem::take(&mut self.labels);
        for label in &labels {
            for column in &label.columns {
                self.require(column)?;
            }
            for row in &mut self.rows {
                let value = compose(&label.template, &label.columns, row);
                let value = label
                    .values
                    .iter()
                    .find(|(from, _)| *from == value)
                    .map_or(value, |(_, to)| to.clone());
                row.insert(label.name.clone(), Value::String(value));
            }
            self.columns.push(label.name.clone());
        }

        let bound = [
            &self.bindings.x,
            &self.bindings.y,
            &self.bindings.color,
            &self.bindings.facet,
            &self.bindings.z,
        ];
        for column in bound.into_iter().flatten() {
            self.require(column)?;
        }
        for order in &self.category_orders {
            self.require(&order.column)?;
        }

        if !self.category_orders.is_empty() {
            let orders = &self.category_orders;
            // Vec::sort_by_key is stable
            self.rows
                .sort_by_key(|row| orders.iter().map(|o| rank(o, row)).collect::<Vec<_>>());
        }

        Ok(ChartSpec {
            kind: self.kind,
            source: self.source,
            title: self.title,
            bindings: self.bindings,
            axis_titles: self.axis_titles,
            log_y: self.log_y,
            category_orders: self.category_orders,
            data: self.rows,
        })
    }
}

fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn compose(template: &str, columns: &[String], row: &JsonRow) -> String {
    let mut values = columns.iter().map(|c| display(row.get(c)));
    let mut parts = template.split("{}");
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str(&values.next().unwrap_or_default());
        out.push_str(part);
    }
    out
}

fn rank(order: &CategoryOrder, row: &JsonRow) -> usize {
    let value = display(row.get(&order.column));
    order
        .labels
        .iter()
        .position(|l| *l == value)
        .unwrap_or(order.labels.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ColumnDef, ColumnType};

    #[derive(Serialize)]
    struct Row {
        borough: Option<String>,
        category: Option<String>,
        trips: i64,
    }

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::nullable("borough", ColumnType::Text),
        ColumnDef::nullable("category", ColumnType::Text),
        ColumnDef::new("trips", ColumnType::Int64),
    ];

    fn row(borough: &str, category: Option<&str>, trips: i64) -> Row {
        Row {
            borough: Some(borough.to_string()),
            category: category.map(String::from),
            trips,
        }
    }

    fn result() -> QueryResult<Row> {
        QueryResult {
            query: "sample",
            columns: COLUMNS,
            rows: vec![
                row("Queens", Some("Hot"), 5),
                row("Bronx", Some("Mild"), 4),
                row("Queens", Some("Freezing"), 3),
                row("Bronx", None, 2),
                row("Brooklyn", Some("Hot"), 1),
            ],
        }
    }

    fn column(spec: &ChartSpec, name: &str) -> Vec<String> {
        spec.data.iter().map(|r| display(r.get(name))).collect()
    }

    #[test]
    fn test_category_order_is_stable_and_keeps_unlisted() -> Result<()> {
        let spec = ChartSpec::new(ChartKind::Bar, &result())?
            .x("category")
            .y("trips")
            .category_order("category", &["Freezing", "Mild", "Hot"])
            .build()?;
        assert_eq!(
            column(&spec, "category"),
            vec!["Freezing", "Mild", "Hot", "Hot", ""]
        );
        assert_eq!(column(&spec, "borough"), vec![
            "Queens", "Bronx", "Queens", "Brooklyn", "Bronx"
        ]);
        Ok(())
    }

    #[test]
    fn test_unknown_binding_is_column_not_found() -> Result<()> {
        let err = ChartSpec::new(ChartKind::Heatmap, &result())?
            .x("borough")
            .z("median_fare")
            .build();
        assert!(matches!(
            err,
            Err(Error::ColumnNotFound { ref relation, ref column })
                if relation == "sample" && column == "median_fare"
        ));
        Ok(())
    }

    #[test]
    fn test_label_composes_columns() -> Result<()> {
        let spec = ChartSpec::new(ChartKind::HorizontalBar, &result())?
            .label("name", &["borough", "category"], "{} ({})")
            .x("trips")
            .y("name")
            .build()?;
        assert_eq!(column(&spec, "name")[0], "Queens (Hot)");
        assert_eq!(column(&spec, "name")[3], "Bronx ()");
        Ok(())
    }

    #[test]
    fn test_value_labels_map_and_pass_through() -> Result<()> {
        let spec = ChartSpec::new(ChartKind::Bar, &result())?
            .value_labels("climate", "category", &[("Hot", "Warm days"), ("Mild", "Mild days")])
            .x("climate")
            .y("trips")
            .build()?;
        assert_eq!(
            column(&spec, "climate"),
            vec!["Warm days", "Mild days", "Freezing", "", "Warm days"]
        );
        Ok(())
    }

    #[test]
    fn test_top_keeps_query_order() -> Result<()> {
        let spec = ChartSpec::new(ChartKind::Bar, &result())?
            .x("borough")
            .y("trips")
            .top(2)
            .build()?;
        assert_eq!(column(&spec, "trips"), vec!["5", "4"]);
        Ok(())
    }

    #[test]
    fn test_spec_serializes() -> Result<()> {
        let spec = ChartSpec::new(ChartKind::Line, &result())?
            .x("borough")
            .y("trips")
            .title("Trips")
            .axis_titles("Borough", "Trips")
            .log_y()
            .build()?;
        let json: Value = serde_json::from_str(&spec.to_json()?)?;
        assert_eq!(json["kind"], "line");
        assert_eq!(json["bindings"]["x"], "borough");
        assert!(json["bindings"].get("z").is_none());
        assert_eq!(json["log_y"], true);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(5));
        Ok(())
    }
}
