//! Spreadsheet export.

use std::path::Path;

use log::{debug, info};
use rust_xlsxwriter::{Format, Workbook};

use super::{values, Value, HEADER};
use crate::{Error, ErrorKind, OutputRow};

/// File name used when no other is given.
pub const DEFAULT_FILE: &str = "book_data.xlsx";

const SHEET_NAME: &str = "Book Data";

/// Writes `rows` as a single sheet workbook to `path`, replacing any existing file.
///
/// # Errors
///
/// An `Err` with [`ErrorKind::IO`] is returned when the workbook cannot be built or saved.
pub fn write<P: AsRef<Path>>(rows: &[OutputRow], path: P) -> Result<(), Error> {
    let path = path.as_ref();
    let mut workbook = build(rows)?;

    workbook.save(path).map_err(|e| {
        Error::new(
            ErrorKind::IO,
            format!("Failed to save '{}': {e}", path.display()),
        )
    })?;

    info!("Exported {} rows to '{}'", rows.len(), path.display());
    Ok(())
}

/// The workbook for `rows` as xlsx bytes.
///
/// # Errors
///
/// An `Err` with [`ErrorKind::IO`] is returned when the workbook cannot be built.
pub fn to_buffer(rows: &[OutputRow]) -> Result<Vec<u8>, Error> {
    build(rows)?
        .save_to_buffer()
        .map_err(|e| Error::new(ErrorKind::IO, format!("Failed to build workbook: {e}")))
}

fn build(rows: &[OutputRow]) -> Result<Workbook, Error> {
    let failed = |e: rust_xlsxwriter::XlsxError| {
        Error::new(ErrorKind::IO, format!("Failed to write sheet '{SHEET_NAME}': {e}"))
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME).map_err(failed)?;

    let bold = Format::new().set_bold();
    for (col, name) in (0u16..).zip(HEADER) {
        worksheet
            .write_string_with_format(0, col, name, &bold)
            .map_err(failed)?;
    }

    for (row, output) in (1u32..).zip(rows) {
        for (col, value) in (0u16..).zip(values(output)) {
            match value {
                Value::Blank => {}
                Value::Number(n) => {
                    worksheet.write_number(row, col, n).map_err(failed)?;
                }
                Value::Text(text) => {
                    worksheet.write_string(row, col, text.as_ref()).map_err(failed)?;
                }
            }
        }
    }

    debug!("Built '{SHEET_NAME}' with {} rows", rows.len());
    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use assert_fs::{fixture::PathChild, TempDir};
    use calamine::{open_workbook_auto, Data, Reader};

    use super::*;
    use crate::export::sample_rows;

    fn read_back(path: &Path) -> calamine::Range<Data> {
        let mut workbook = open_workbook_auto(path).unwrap();
        assert_eq!(vec![SHEET_NAME.to_owned()], workbook.sheet_names());
        workbook.worksheet_range(SHEET_NAME).unwrap()
    }

    fn string(s: &str) -> Data {
        Data::String(s.to_owned())
    }

    #[test]
    fn writes_header_then_one_row_per_output() {
        let dir = TempDir::new().unwrap();
        let file = dir.child(DEFAULT_FILE);

        write(&sample_rows(), file.path()).unwrap();
        assert!(file.path().exists());

        let range = read_back(file.path());
        assert_eq!((3, 60), range.get_size());

        for (col, name) in (0u32..).zip(HEADER) {
            assert_eq!(Some(&string(name)), range.get_value((0, col)));
        }

        assert_eq!(Some(&string("QnghAQAAIAAJ")), range.get_value((1, 0)));
        assert_eq!(Some(&Data::Float(499.0)), range.get_value((1, 4)));
        assert_eq!(Some(&string("Complete")), range.get_value((1, 59)));
        assert_eq!(Some(&string("Dune")), range.get_value((2, 2)));
        // blank price for the second row
        assert_eq!(Some(&Data::Empty), range.get_value((2, 4)));
        assert_eq!(Some(&string("Partial")), range.get_value((2, 59)));
    }

    #[test]
    fn exporting_twice_gives_the_same_sheet() {
        let dir = TempDir::new().unwrap();
        let first = dir.child("first.xlsx");
        let second = dir.child("second.xlsx");
        let rows = sample_rows();

        write(&rows, first.path()).unwrap();
        write(&rows, second.path()).unwrap();

        let (first, second) = (read_back(first.path()), read_back(second.path()));
        assert_eq!(
            first.rows().collect::<Vec<_>>(),
            second.rows().collect::<Vec<_>>()
        );
    }

    #[test]
    fn no_rows_is_a_header_only_sheet() {
        let dir = TempDir::new().unwrap();
        let file = dir.child(DEFAULT_FILE);

        write(&[], file.path()).unwrap();

        assert_eq!((1, 60), read_back(file.path()).get_size());
    }

    #[test]
    fn buffer_is_an_xlsx_archive() {
        let buffer = to_buffer(&sample_rows()).unwrap();
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = write(&sample_rows(), dir.path().join("missing").join(DEFAULT_FILE)).unwrap_err();

        assert_eq!(ErrorKind::IO, err.kind());
    }
}
