//! Date-indexed table of named columns, and the pure transforms applied to it.
//!
//! A [`SeriesFrame`] is built once from provider observations and never
//! mutated; every transform (`fill_missing`, `normalize`, `pct_change`)
//! returns a new frame of the same shape.

use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{format_date, FrameError, ObservationSeries, ValidationError};

/// Reference value every column starts at after [`SeriesFrame::normalize`].
pub const NORMALIZED_BASE: f64 = 100.0;

/// How the row index is derived when series publish on different calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignMode {
    /// Every date seen in any series becomes a row.
    #[default]
    Union,
    /// The first series' dates are the index; other series are reindexed
    /// onto it and their dates outside it are dropped.
    Anchor,
}

impl AlignMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Anchor => "anchor",
        }
    }
}

impl Display for AlignMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlignMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "union" => Ok(Self::Union),
            "anchor" => Ok(Self::Anchor),
            _ => Err(ValidationError::InvalidAlignment {
                value: value.to_owned(),
            }),
        }
    }
}

/// A named column; one cell per index row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|value| value.filter(|v| v.is_finite()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_none()).count()
    }

    pub fn first_present(&self) -> Option<f64> {
        self.values.iter().flatten().next().copied()
    }

    pub fn last_present(&self) -> Option<f64> {
        self.values.iter().rev().flatten().next().copied()
    }

    fn map_values(&self, values: Vec<Option<f64>>) -> Self {
        Self::new(self.name.clone(), values)
    }
}

/// Rows keyed by strictly increasing dates, columns in catalog order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesFrame {
    index: Vec<Date>,
    columns: Vec<Column>,
}

impl SeriesFrame {
    pub fn new(index: Vec<Date>, columns: Vec<Column>) -> Result<Self, FrameError> {
        if let Some(row) = index.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(FrameError::UnsortedIndex { row: row + 1 });
        }

        let mut names = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.values.len() != index.len() {
                return Err(FrameError::LengthMismatch {
                    column: column.name.clone(),
                    expected: index.len(),
                    actual: column.values.len(),
                });
            }
            if !names.insert(column.name.as_str()) {
                return Err(FrameError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }

        Ok(Self { index, columns })
    }

    /// Build a frame from a row-major grid; convenient for fixtures.
    pub fn from_rows(
        index: Vec<Date>,
        names: &[&str],
        rows: &[Vec<Option<f64>>],
    ) -> Result<Self, FrameError> {
        let columns = names
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let values = rows
                    .iter()
                    .map(|row| row.get(col).copied().flatten())
                    .collect();
                Column::new(*name, values)
            })
            .collect::<Vec<_>>();
        if rows.len() != index.len() {
            let column = names.first().copied().unwrap_or_default().to_owned();
            return Err(FrameError::LengthMismatch {
                column,
                expected: index.len(),
                actual: rows.len(),
            });
        }
        Self::new(index, columns)
    }

    /// Align named observation series into one table.
    pub fn from_series(
        series: Vec<(String, ObservationSeries)>,
        align: AlignMode,
    ) -> Result<Self, FrameError> {
        let index: Vec<Date> = match align {
            AlignMode::Union => series
                .iter()
                .flat_map(|(_, observations)| observations.dates())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            AlignMode::Anchor => series
                .first()
                .map(|(_, observations)| observations.dates().collect())
                .unwrap_or_default(),
        };

        let columns = series
            .into_iter()
            .map(|(name, observations)| {
                let values = index
                    .iter()
                    .map(|date| observations.value_on(*date))
                    .collect();
                Column::new(name, values)
            })
            .collect();

        Self::new(index, columns)
    }

    pub fn index(&self) -> &[Date] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.index.first().copied()
    }

    pub fn last_date(&self) -> Option<Date> {
        self.index.last().copied()
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.columns
            .get(column)
            .and_then(|col| col.values.get(row).copied().flatten())
    }

    pub fn row(&self, row: usize) -> Vec<Option<f64>> {
        self.columns
            .iter()
            .map(|column| column.values.get(row).copied().flatten())
            .collect()
    }

    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Last `rows` rows (or all of them).
    pub fn tail(&self, rows: usize) -> Self {
        let skip = self.index.len().saturating_sub(rows);
        Self {
            index: self.index[skip..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|column| column.map_values(column.values[skip..].to_vec()))
                .collect(),
        }
    }

    /// Carry the nearest prior present value into each gap.
    pub fn forward_fill(&self) -> Self {
        self.map_columns(|values| {
            let mut last = None;
            values
                .iter()
                .map(|value| {
                    if value.is_some() {
                        last = *value;
                    }
                    last
                })
                .collect()
        })
    }

    /// Carry the nearest subsequent present value into each gap.
    pub fn backward_fill(&self) -> Self {
        self.map_columns(|values| {
            let mut next = None;
            let mut filled: Vec<Option<f64>> = values
                .iter()
                .rev()
                .map(|value| {
                    if value.is_some() {
                        next = *value;
                    }
                    next
                })
                .collect();
            filled.reverse();
            filled
        })
    }

    /// Forward fill, then backward fill the leading gap. Columns with no
    /// present value stay fully missing.
    pub fn fill_missing(&self) -> Self {
        self.forward_fill().backward_fill()
    }

    /// Rebase every column so its first-row value becomes 100.
    ///
    /// Cells whose rebased value is not finite (first row missing or zero)
    /// are missing.
    pub fn normalize(&self) -> Self {
        self.map_columns(|values| {
            let base = values.first().copied().flatten();
            values
                .iter()
                .map(|value| match (value, base) {
                    (Some(value), Some(base)) => Some(value / base * NORMALIZED_BASE),
                    _ => None,
                })
                .collect()
        })
    }

    /// Period-over-period fractional change; the first row is missing.
    pub fn pct_change(&self) -> Self {
        self.map_columns(|values| {
            let mut changes = Vec::with_capacity(values.len());
            changes.extend(values.first().map(|_| None));
            changes.extend(values.windows(2).map(|pair| match (pair[0], pair[1]) {
                (Some(prev), Some(curr)) => Some(curr / prev - 1.0),
                _ => None,
            }));
            changes
        })
    }

    fn map_columns<F>(&self, transform: F) -> Self
    where
        F: Fn(&[Option<f64>]) -> Vec<Option<f64>>,
    {
        Self {
            index: self.index.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| column.map_values(transform(&column.values)))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct FrameView<'a> {
    index: Vec<String>,
    columns: Vec<ColumnView<'a>>,
}

#[derive(Serialize)]
struct ColumnView<'a> {
    name: &'a str,
    values: &'a [Option<f64>],
}

impl Serialize for SeriesFrame {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        FrameView {
            index: self.index.iter().copied().map(format_date).collect(),
            columns: self
                .columns
                .iter()
                .map(|column| ColumnView {
                    name: &column.name,
                    values: &column.values,
                })
                .collect(),
        }
        .serialize(serializer)
    }
}
