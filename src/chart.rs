//! Chart extraction from result tables.
//!
//! The chart view binds an X column (labels) and a Y column (values) of
//! a result table to a chart kind. Binding a column that does not exist
//! in the table is an error; beyond that no validation happens, matching
//! the hands-off behavior of the charting layer this stands in for: a
//! non-numeric Y column simply charts as zeros.

use thiserror::Error;

use crate::table::ResultTable;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Result table has no rows to chart")]
    EmptyTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Pie => "Pie Chart",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ChartKind::Bar => ChartKind::Line,
            ChartKind::Line => ChartKind::Pie,
            ChartKind::Pie => ChartKind::Bar,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x: String,
    pub y: String,
}

/// Label/value series ready for drawing.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(String, f64)>,
}

impl ChartSpec {
    pub fn build(&self, table: &ResultTable) -> Result<ChartData, ChartError> {
        let x_idx = table
            .schema
            .column_index(&self.x)
            .ok_or_else(|| ChartError::ColumnNotFound(self.x.clone()))?;
        let y_idx = table
            .schema
            .column_index(&self.y)
            .ok_or_else(|| ChartError::ColumnNotFound(self.y.clone()))?;

        if table.is_empty() {
            return Err(ChartError::EmptyTable);
        }

        let points = table
            .rows
            .iter()
            .map(|row| {
                let label = row
                    .get(x_idx)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                let value = row
                    .get(y_idx)
                    .and_then(|v| v.as_float())
                    .unwrap_or(0.0);
                (label, value)
            })
            .collect();

        Ok(ChartData {
            kind: self.kind,
            x_label: self.x.clone(),
            y_label: self.y.clone(),
            points,
        })
    }
}

impl ChartData {
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max)
    }

    pub fn min_value(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).fold(f64::MAX, f64::min)
    }

    /// Slice fractions for the pie view. Negative values contribute
    /// nothing; an all-zero series yields an empty slice list.
    pub fn pie_fractions(&self) -> Vec<(String, f64)> {
        let total: f64 = self.points.iter().map(|(_, v)| v.max(0.0)).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        self.points
            .iter()
            .filter(|(_, v)| *v > 0.0)
            .map(|(label, v)| (label.clone(), v / total))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, DataType, Row, Schema, Value};

    fn sample_table() -> ResultTable {
        ResultTable::with_rows(
            Schema::new(vec![
                Column::new("category", DataType::String),
                Column::new("total_profit", DataType::Float),
            ]),
            vec![
                Row::new(vec![
                    Value::String("Furniture".into()),
                    Value::Float(20.0),
                ]),
                Row::new(vec![
                    Value::String("Technology".into()),
                    Value::Float(60.0),
                ]),
            ],
        )
    }

    #[test]
    fn test_bar_chart_builds_from_valid_bindings() {
        let spec = ChartSpec {
            kind: ChartKind::Bar,
            x: "category".into(),
            y: "total_profit".into(),
        };
        let data = spec.build(&sample_table()).unwrap();

        assert_eq!(data.points.len(), 2);
        assert_eq!(data.points[0], ("Furniture".to_string(), 20.0));
        assert_eq!(data.max_value(), 60.0);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let spec = ChartSpec {
            kind: ChartKind::Bar,
            x: "category".into(),
            y: "no_such_column".into(),
        };
        let err = spec.build(&sample_table()).unwrap_err();
        assert!(matches!(err, ChartError::ColumnNotFound(ref c) if c == "no_such_column"));
    }

    #[test]
    fn test_empty_table_cannot_be_charted() {
        let table = ResultTable::new(Schema::new(vec![
            Column::new("category", DataType::String),
            Column::new("total_profit", DataType::Float),
        ]));
        let spec = ChartSpec {
            kind: ChartKind::Line,
            x: "category".into(),
            y: "total_profit".into(),
        };
        assert!(matches!(spec.build(&table), Err(ChartError::EmptyTable)));
    }

    #[test]
    fn test_non_numeric_y_coerces_to_zero() {
        let spec = ChartSpec {
            kind: ChartKind::Bar,
            x: "total_profit".into(),
            y: "category".into(),
        };
        let data = spec.build(&sample_table()).unwrap();
        assert_eq!(data.points[0].1, 0.0);
    }

    #[test]
    fn test_pie_fractions_sum_to_one() {
        let spec = ChartSpec {
            kind: ChartKind::Pie,
            x: "category".into(),
            y: "total_profit".into(),
        };
        let data = spec.build(&sample_table()).unwrap();
        let fractions = data.pie_fractions();

        let total: f64 = fractions.iter().map(|(_, f)| f).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(fractions[0].0, "Furniture");
        assert!((fractions[0].1 - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_chart_kind_cycle() {
        assert_eq!(ChartKind::Bar.next(), ChartKind::Line);
        assert_eq!(ChartKind::Line.next(), ChartKind::Pie);
        assert_eq!(ChartKind::Pie.next(), ChartKind::Bar);
    }
}
