//! Review dataset readers.
//!
//! The pipeline consumes a [`ReviewSheet`]: a format-agnostic header row
//! plus data rows. Readers are provided for CSV files and spreadsheet
//! workbooks (xlsx, xls, ods); hosts with their own tabular source can
//! construct a sheet directly with [`ReviewSheet::new`].
//!
//! Readers do not enforce the required-column schema. That check belongs to
//! the pipeline so it always runs before any feed traffic.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader as WorkbookReader, Xlsx};
use tracing::debug;

use crate::error::{DatasetError, DatasetResult, GenerateError};
use crate::types::{ReviewRow, REQUIRED_COLUMNS};

/// Tabular review input: one header row plus zero or more data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSheet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReviewSheet {
    /// Build a sheet from pre-parsed parts.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Header cells, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows, in file order. Rows may be shorter than the header;
    /// missing cells read as empty.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// True when the sheet has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Required columns absent from this sheet, in canonical order.
    pub fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|required| !self.columns.iter().any(|header| header == *required))
            .map(|required| required.to_string())
            .collect()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|header| header == name)
    }

    /// Project data rows into typed review rows.
    ///
    /// Fails with [`GenerateError::MissingColumns`] when any required column
    /// is absent. Extra columns are ignored; cells missing from short rows
    /// read as empty. Row numbers are 1-based and exclude the header.
    pub fn review_rows(&self) -> Result<Vec<ReviewRow>, GenerateError> {
        let (Some(product_name), Some(review_content), Some(rating), Some(reviewer)) = (
            self.column_index(REQUIRED_COLUMNS[0]),
            self.column_index(REQUIRED_COLUMNS[1]),
            self.column_index(REQUIRED_COLUMNS[2]),
            self.column_index(REQUIRED_COLUMNS[3]),
        ) else {
            return Err(GenerateError::MissingColumns {
                missing: self.missing_columns(),
            });
        };

        Ok(self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| ReviewRow {
                row: i + 1,
                product_name: cell(row, product_name),
                review_content: cell(row, review_content),
                rating: cell(row, rating),
                reviewer: cell(row, reviewer),
            })
            .collect())
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

/// Read a review sheet from CSV bytes. The first record is the header row.
pub fn read_csv<R: Read>(reader: R) -> DatasetResult<ReviewSheet> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    debug!(columns = columns.len(), rows = rows.len(), "CSV dataset read");
    Ok(ReviewSheet::new(columns, rows))
}

/// Read a review sheet from xlsx bytes (in memory or on disk).
///
/// The first worksheet is used; its first row is the header row.
pub fn read_xlsx<RS: Read + Seek>(reader: RS) -> DatasetResult<ReviewSheet> {
    let mut workbook = Xlsx::new(reader).map_err(calamine::Error::from)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DatasetError::NoWorksheet)?
        .map_err(calamine::Error::from)?;

    Ok(range_to_sheet(&range))
}

/// Read a review sheet from a file, dispatching on the extension.
///
/// `.csv` goes through the CSV reader; `.xlsx`, `.xlsm`, `.xls` and `.ods`
/// through the workbook reader. Anything else is
/// [`DatasetError::UnsupportedFormat`].
pub fn read_path(path: &Path) -> DatasetResult<ReviewSheet> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" => read_csv(BufReader::new(File::open(path)?)),
        "xlsx" | "xlsm" | "xls" | "ods" => {
            let mut workbook = open_workbook_auto(path)?;
            let range = workbook
                .worksheet_range_at(0)
                .ok_or(DatasetError::NoWorksheet)??;

            debug!(path = %path.display(), "workbook dataset read");
            Ok(range_to_sheet(&range))
        }
        _ => Err(DatasetError::UnsupportedFormat { extension }),
    }
}

fn range_to_sheet(range: &Range<Data>) -> ReviewSheet {
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>());

    let columns = rows.next().unwrap_or_default();
    ReviewSheet::new(columns, rows.collect())
}

/// Render a workbook cell the way it reads in the spreadsheet UI.
///
/// Numeric cells surface as floats even for whole numbers; `5.0` renders
/// as `"5"` so ratings survive the trip through a workbook.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}
