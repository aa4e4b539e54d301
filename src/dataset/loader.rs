use std::{fs::File, path::Path};

use log::debug;
use polars::prelude::*;

use super::{DataError, Result};
use crate::features::{Feature, LoanStatus, N_FEATURES};

/// Historical records after encoding, before missing values are filled.
#[derive(Debug, Clone)]
pub struct EncodedTable {
    /// One vector per feature, in `Feature::ALL` order. `None` marks a missing cell.
    columns: Vec<Vec<Option<f64>>>,
    labels: Vec<usize>,
}

impl EncodedTable {
    /// Builds a table from already encoded columns.
    ///
    /// # Errors
    /// `DataError::ShapeMismatch` if the column count or lengths don't line up with `labels`.
    pub fn new(columns: Vec<Vec<Option<f64>>>, labels: Vec<usize>) -> Result<Self> {
        if columns.len() != N_FEATURES {
            return Err(DataError::ShapeMismatch {
                what: "columns",
                got: columns.len(),
                expected: N_FEATURES,
            });
        }

        if let Some(col) = columns.iter().find(|col| col.len() != labels.len()) {
            return Err(DataError::ShapeMismatch {
                what: "column rows",
                got: col.len(),
                expected: labels.len(),
            });
        }

        Ok(Self { columns, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn column(&self, feature: Feature) -> &[Option<f64>] {
        &self.columns[feature.index()]
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub(super) fn into_parts(self) -> (Vec<Vec<Option<f64>>>, Vec<usize>) {
        (self.columns, self.labels)
    }
}

/// Reads a CSV file with a header row, keeping every column as text.
///
/// Typing is left to the feature encoder so the CSV goes through the exact same
/// parsing rules as a request body.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;

    debug!("read {} rows x {} columns from {}", df.height(), df.width(), path.display());
    Ok(df)
}

/// Returns a text column of the frame.
pub(super) fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;

    Ok(column.as_materialized_series().str()?)
}

/// Returns the trimmed cell, or `None` when it's null or blank.
pub(super) fn present(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

/// Encodes every feature column and the target of a raw frame.
///
/// # Errors
/// Fails on the first missing column, invalid cell or invalid label.
pub fn encode_frame(df: &DataFrame) -> Result<EncodedTable> {
    if df.height() == 0 {
        return Err(DataError::Empty);
    }

    let mut columns = Vec::with_capacity(N_FEATURES);
    for feature in Feature::ALL {
        let raw = text_column(df, feature.column())?;
        let encoded = raw
            .into_iter()
            .enumerate()
            .map(|(idx, cell)| match present(cell) {
                Some(value) => feature
                    .encode(value)
                    .map(Some)
                    .map_err(|source| DataError::InvalidCell {
                        row: idx + 1,
                        source,
                    }),
                None => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;
        columns.push(encoded);
    }

    let labels = text_column(df, LoanStatus::COLUMN)?
        .into_iter()
        .enumerate()
        .map(|(idx, cell)| {
            present(cell)
                .and_then(LoanStatus::parse)
                .map(LoanStatus::class)
                .ok_or_else(|| DataError::InvalidLabel {
                    row: idx + 1,
                    value: present(cell).map(str::to_string),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    EncodedTable::new(columns, labels)
}

/// Reads and encodes a historical CSV.
pub fn load_csv(path: &Path) -> Result<EncodedTable> {
    encode_frame(&read_csv(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(rows: &[[&str; 13]]) -> DataFrame {
        let header = [
            "Loan_ID",
            "Gender",
            "Married",
            "Dependents",
            "Education",
            "Self_Employed",
            "ApplicantIncome",
            "CoapplicantIncome",
            "LoanAmount",
            "Loan_Amount_Term",
            "Credit_History",
            "Property_Area",
            "Loan_Status",
        ];

        let columns = header
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let values: Vec<Option<&str>> = rows
                    .iter()
                    .map(|row| Some(row[c]).filter(|v| !v.is_empty()))
                    .collect();
                Column::new((*name).into(), values)
            })
            .collect();

        DataFrame::new(columns).unwrap()
    }

    const ROW: [&str; 13] = [
        "LP001002", "Male", "No", "0", "Graduate", "No", "5849", "0", "", "360", "1.0", "Urban",
        "Y",
    ];

    #[test]
    fn encodes_rows_and_keeps_missing_cells() {
        let mut second = ROW;
        second[1] = "Female";
        second[12] = "N";
        let table = encode_frame(&frame(&[ROW, second])).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column(Feature::Gender), &[Some(1.0), Some(0.0)]);
        assert_eq!(table.column(Feature::LoanAmount), &[None, None]);
        assert_eq!(table.column(Feature::CreditHistory), &[Some(1.0), Some(1.0)]);
        assert_eq!(table.labels(), &[1, 0]);
    }

    #[test]
    fn invalid_cell_reports_row_and_column() {
        let mut bad = ROW;
        bad[11] = "Downtown";
        let err = encode_frame(&frame(&[ROW, bad])).unwrap_err();
        match err {
            DataError::InvalidCell { row, source } => {
                assert_eq!(row, 2);
                assert_eq!(source.field(), "Property_Area");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_label_is_an_error() {
        let mut bad = ROW;
        bad[12] = "";
        let err = encode_frame(&frame(&[bad])).unwrap_err();
        assert!(matches!(err, DataError::InvalidLabel { row: 1, value: None }));
    }

    #[test]
    fn missing_column_is_named() {
        let df = frame(&[ROW]).drop("Married").unwrap();
        let err = encode_frame(&df).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(ref c) if c == "Married"));
    }

    #[test]
    fn table_shape_must_match_labels() {
        let err = EncodedTable::new(vec![vec![Some(1.0)]; 3], vec![1]).unwrap_err();
        assert!(matches!(
            err,
            DataError::ShapeMismatch { what: "columns", got: 3, expected: N_FEATURES }
        ));

        let mut columns = vec![vec![Some(1.0), None]; N_FEATURES];
        columns[4].pop();
        let err = EncodedTable::new(columns, vec![1, 0]).unwrap_err();
        assert_eq!(err.to_string(), "shape mismatch for column rows: got 1, expected 2");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
