use std::path::Path;

use polars::prelude::DataFrame;
use serde::Serialize;

use super::{
    loader::{present, read_csv, text_column},
    Result,
};
use crate::features::LoanStatus;

/// Missing-value and label counts of a raw historical CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    /// `(column, missing cells)` for every column in file order.
    pub missing: Vec<(String, usize)>,
    pub labels: Vec<LabelCount>,
}

/// How often a raw `Loan_Status` value occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub value: String,
    pub count: usize,
    pub proportion: f64,
}

impl DatasetSummary {
    /// Summarizes a CSV without encoding it, so files with invalid cells can be inspected too.
    pub fn from_csv(path: &Path) -> Result<Self> {
        Self::from_frame(&read_csv(path)?)
    }

    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let rows = df.height();

        let mut missing = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let name = column.name().to_string();
            let count = text_column(df, &name)?
                .into_iter()
                .filter(|cell| present(*cell).is_none())
                .count();
            missing.push((name, count));
        }

        let mut labels: Vec<LabelCount> = Vec::new();
        for cell in text_column(df, LoanStatus::COLUMN)?.into_iter() {
            let Some(value) = present(cell) else {
                continue;
            };
            match labels.iter_mut().find(|l| l.value == value) {
                Some(label) => label.count += 1,
                None => labels.push(LabelCount {
                    value: value.to_string(),
                    count: 1,
                    proportion: 0.0,
                }),
            }
        }

        let labelled: usize = labels.iter().map(|l| l.count).sum();
        for label in &mut labels {
            label.proportion = label.count as f64 / labelled as f64;
        }
        labels.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

        Ok(Self {
            rows,
            missing,
            labels,
        })
    }

    /// Total number of missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|(_, n)| n).sum()
    }
}
