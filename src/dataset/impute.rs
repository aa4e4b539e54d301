use ndarray::{Array1, Array2};

use super::{DataError, Dataset, EncodedTable, Result};
use crate::features::{Feature, N_FEATURES};

/// Fills missing cells with the median of each column's observed values.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianImputer {
    medians: [f64; N_FEATURES],
}

impl MedianImputer {
    /// Computes per-column medians.
    ///
    /// # Errors
    /// `DataError::NoObservedValues` if any column is entirely missing.
    pub fn fit(table: &EncodedTable) -> Result<Self> {
        let mut medians = [0.0; N_FEATURES];
        for feature in Feature::ALL {
            let observed: Vec<f64> = table.column(feature).iter().flatten().copied().collect();
            medians[feature.index()] =
                median(observed).ok_or(DataError::NoObservedValues(feature.column()))?;
        }

        Ok(Self { medians })
    }

    pub fn median(&self, feature: Feature) -> f64 {
        self.medians[feature.index()]
    }

    /// Replaces every missing cell and lays the table out as a row-major matrix.
    pub fn transform(&self, table: EncodedTable) -> Result<Dataset> {
        let (columns, labels) = table.into_parts();
        let x = Array2::from_shape_fn((labels.len(), N_FEATURES), |(r, c)| {
            columns[c][r].unwrap_or(self.medians[c])
        });

        Dataset::new(x, Array1::from_vec(labels))
    }
}

/// Median of the values, averaging the two middle ones for even counts.
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
