//! Pairwise Pearson correlation between the columns of a [`SeriesFrame`].

use serde::Serialize;

use crate::SeriesFrame;

/// Square, symmetric matrix labelled by column names.
///
/// A cell is `None` when fewer than two rows have both values present or
/// when either side has zero variance over those rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    labels: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Pearson correlation over pairwise-complete rows.
    pub fn pearson(frame: &SeriesFrame) -> Self {
        let columns = frame.columns();
        let n = columns.len();
        let mut values = vec![vec![None; n]; n];

        for i in 0..n {
            for j in i..n {
                let r = pearson_pair(columns[i].values(), columns[j].values());
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            labels: columns
                .iter()
                .map(|column| column.name().to_owned())
                .collect(),
            values,
        }
    }

    /// Correlation of period-over-period changes, the usual way to compare
    /// trending series.
    pub fn of_returns(frame: &SeriesFrame) -> Self {
        Self::pearson(&frame.pct_change())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.values.get(row)?.get(column).copied().flatten()
    }

    pub fn get_by_name(&self, row: &str, column: &str) -> Option<f64> {
        let row = self.labels.iter().position(|label| label == row)?;
        let column = self.labels.iter().position(|label| label == column)?;
        self.get(row, column)
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }
}

fn pearson_pair(left: &[Option<f64>], right: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = left
        .iter()
        .zip(right)
        .filter_map(|(l, r)| Some(((*l)?, (*r)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let count = pairs.len() as f64;
    let mean_l = pairs.iter().map(|(l, _)| l).sum::<f64>() / count;
    let mean_r = pairs.iter().map(|(_, r)| r).sum::<f64>() / count;

    let (mut cov, mut var_l, mut var_r) = (0.0, 0.0, 0.0);
    for (l, r) in &pairs {
        let dl = l - mean_l;
        let dr = r - mean_r;
        cov += dl * dr;
        var_l += dl * dl;
        var_r += dr * dr;
    }

    // Rounding noise around a constant column is not variance.
    let floor = |mean: f64| (mean.abs().max(1.0) * f64::EPSILON * 4.0).powi(2) * count;
    if var_l <= floor(mean_l) || var_r <= floor(mean_r) {
        return None;
    }

    let r = cov / (var_l.sqrt() * var_r.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
