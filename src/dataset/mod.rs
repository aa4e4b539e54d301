//! Historical loan records: CSV loading, imputation and splitting.

mod error;
mod impute;
mod loader;
mod split;
mod summary;

use ndarray::{Array1, Array2, Axis};

pub use error::{DataError, Result};
pub use impute::MedianImputer;
pub use loader::{encode_frame, load_csv, read_csv, EncodedTable};
pub use split::train_test_split;
pub use summary::{DatasetSummary, LabelCount};

/// A fully numeric dataset: one row per application, one class index per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array1<usize>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Errors
    /// `DataError::ShapeMismatch` if `y` doesn't have one label per row of `x`.
    pub fn new(x: Array2<f64>, y: Array1<usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(DataError::ShapeMismatch {
                what: "labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<usize> {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of samples per class, indexed by class.
    pub fn class_counts(&self) -> Vec<usize> {
        let n_classes = self.y.iter().max().map_or(0, |&c| c + 1);
        let mut counts = vec![0; n_classes];
        for &c in &self.y {
            counts[c] += 1;
        }
        counts
    }

    /// Returns a new dataset with the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), rows),
            y: self.y.select(Axis(0), rows),
        }
    }
}
