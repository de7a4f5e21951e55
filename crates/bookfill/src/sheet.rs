//! Reading the input spreadsheet.
//!
//! Only the first worksheet is read. Row 1 is the header and data starts at row 2; which column
//! holds which value is described by a [`ColumnLayout`].

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, trace};

use crate::{Error, ErrorKind};

/// A single cell value from the input sheet.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// No value, also used for error cells.
    Empty,
    /// A numeric cell; dates are kept as their serial number.
    Number(f64),
    /// A text cell, booleans read as `TRUE` or `FALSE`.
    Text(String),
}

impl Cell {
    /// Whether the cell holds no value, blank text counts as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// The cell rendered as text, whole numbers are written without a fraction so an ISBN stored
    /// as a number reads back as the ISBN.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_owned(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Text(s.clone()),
            Data::Float(n) => Self::Number(*n),
            #[allow(clippy::cast_precision_loss)]
            Data::Int(n) => Self::Number(*n as f64),
            Data::Bool(b) => Self::Text(if *b { "TRUE" } else { "FALSE" }.to_owned()),
            Data::DateTime(dt) => Self::Number(dt.as_f64()),
        }
    }
}

/// A data row of the input sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    /// 1-based row number as shown by a spreadsheet application.
    pub number: usize,
    /// Cells from column A onwards.
    pub cells: Vec<Cell>,
}

impl RawRow {
    /// The cell at a zero-based column offset, [`Cell::Empty`] past the end of the row.
    #[must_use]
    pub fn cell(&self, column: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.cells.get(column).unwrap_or(&EMPTY)
    }
}

/// The data rows of the first worksheet of a workbook.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSheet {
    /// Worksheet name.
    pub name: String,
    /// Data rows below the header, in sheet order.
    pub rows: Vec<RawRow>,
}

impl InputSheet {
    /// Whether the sheet has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Zero-based column offsets of the values read from each data row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Column holding the ISBN.
    pub identifier: usize,
    /// Column holding the price the book is sold at.
    pub selling_price: usize,
    /// Column holding the price the book was bought at.
    pub purchase_price: usize,
    /// Column holding the stock quantity.
    pub quantity: usize,
    /// Round the selling price to the nearest ten.
    pub round_selling_price: bool,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            identifier: 0,
            selling_price: 1,
            purchase_price: 2,
            quantity: 3,
            round_selling_price: false,
        }
    }
}

/// Reads the first worksheet of the workbook at `path`.
///
/// Supports every workbook format `calamine` can open (xlsx, xlsm, xlsb, xls and ods).
///
/// # Errors
///
/// An `Err` is returned when the file cannot be opened or is not a readable workbook.
/// An `Err` is returned when the workbook has no worksheets.
pub fn read<P: AsRef<Path>>(path: P) -> Result<InputSheet, Error> {
    let path = path.as_ref();
    trace!("Opening workbook '{}'", path.display());

    let mut workbook = open_workbook_auto(path).map_err(|e| {
        Error::new(
            ErrorKind::Deserialize,
            format!("Failed to open '{}' as a spreadsheet: {e}", path.display()),
        )
    })?;

    let name = first_sheet(path, &workbook.sheet_names())?;

    let range = workbook.worksheet_range(&name).map_err(|e| {
        Error::new(
            ErrorKind::Deserialize,
            format!("Failed to read sheet '{name}': {e}"),
        )
    })?;

    // the used range may not begin at A1
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let rows = range
        .rows()
        .enumerate()
        .map(|(i, cells)| RawRow {
            number: start_row + i + 1,
            cells: std::iter::repeat(Cell::Empty)
                .take(start_col)
                .chain(cells.iter().map(Cell::from))
                .collect(),
        })
        .filter(|row| row.number > 1)
        .collect::<Vec<_>>();

    debug!("Read {} data rows from sheet '{name}'", rows.len());

    Ok(InputSheet { name, rows })
}

fn first_sheet(path: &Path, names: &[String]) -> Result<String, Error> {
    names.first().cloned().ok_or_else(|| {
        Error::new(
            ErrorKind::Deserialize,
            format!("'{}' contains no sheets", path.display()),
        )
    })
}

/// Converts spreadsheet column letters into a zero-based offset (`A` => 0, `AA` => 26).
///
/// # Errors
///
/// An `Err` is returned when `letters` is empty or contains anything other than ASCII letters.
/// An `Err` is returned when `letters` names a column too far right to be addressed.
pub fn column_index(letters: &str) -> Result<usize, Error> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::new(
            ErrorKind::Deserialize,
            format!("'{letters}' is not a spreadsheet column, expected letters such as A or AB"),
        ));
    }

    let index = letters.chars().try_fold(0usize, |acc, c| {
        acc.checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1)
    });

    index.map(|i| i - 1).ok_or_else(|| {
        Error::new(
            ErrorKind::Deserialize,
            format!("'{letters}' is past the last column a spreadsheet can have"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::{fixture::PathChild, TempDir};

    #[test]
    fn column_letters_map_to_offsets() {
        assert_eq!(0, column_index("A").unwrap());
        assert_eq!(3, column_index("d").unwrap());
        assert_eq!(25, column_index("Z").unwrap());
        assert_eq!(26, column_index("AA").unwrap());
        assert_eq!(27, column_index(" AB ").unwrap());
    }

    #[test]
    #[should_panic(expected = "is not a spreadsheet column")]
    fn column_with_digits_is_rejected() {
        column_index("A1").unwrap();
    }

    #[test]
    fn last_xlsx_column_is_accepted() {
        assert_eq!(16383, column_index("XFD").unwrap());
    }

    #[test]
    #[should_panic(expected = "past the last column")]
    fn overlong_column_is_rejected() {
        column_index("ZZZZZZZZZZZZZZ").unwrap();
    }

    #[test]
    fn numeric_isbn_cell_renders_without_fraction() {
        assert_eq!("9780000000002", Cell::Number(9_780_000_000_002.0).to_text());
        assert_eq!("12.5", Cell::Number(12.5).to_text());
        assert_eq!("0735619670", Cell::from(" 0735619670 ").to_text());
    }

    #[test]
    fn cell_past_end_of_row_is_empty() {
        let row = RawRow {
            number: 2,
            cells: vec![Cell::from("isbn")],
        };
        assert_eq!(&Cell::Empty, row.cell(3));
    }

    #[test]
    fn read_skips_header_and_keeps_sheet_row_numbers() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let path = dir.child("input.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "ISBN").unwrap();
        sheet.write_string(0, 1, "Price").unwrap();
        sheet.write_number(1, 0, 9_780_000_000_002.0).unwrap();
        sheet.write_string(1, 1, "12.5 EUR").unwrap();
        sheet.write_string(2, 0, "0735619670").unwrap();
        workbook.save(path.path()).unwrap();

        let input = read(path.path()).unwrap();

        assert_eq!(2, input.rows.len());
        assert_eq!(2, input.rows[0].number);
        assert_eq!("9780000000002", input.rows[0].cell(0).to_text());
        assert_eq!(&Cell::from("12.5 EUR"), input.rows[0].cell(1));
        assert_eq!(3, input.rows[1].number);
        assert_eq!(&Cell::Empty, input.rows[1].cell(1));
    }

    #[test]
    fn header_only_sheet_is_empty() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let path = dir.child("header.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        workbook.add_worksheet().write_string(0, 0, "ISBN").unwrap();
        workbook.save(path.path()).unwrap();

        assert!(read(path.path()).unwrap().is_empty());
    }

    #[test]
    #[should_panic(expected = "as a spreadsheet")]
    fn non_spreadsheet_file_fails_to_read() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let path = dir.child("notes.xlsx");
        std::fs::write(path.path(), "not a workbook").unwrap();

        read(path.path()).unwrap();
    }

    #[test]
    fn workbook_without_sheets_is_a_deserialize_error() {
        let err = first_sheet(Path::new("empty.xlsx"), &[]).unwrap_err();

        assert_eq!(ErrorKind::Deserialize, err.kind());
        assert!(err.to_string().contains("'empty.xlsx' contains no sheets"));
    }

    #[test]
    fn non_spreadsheet_file_is_a_deserialize_error() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let path = dir.child("notes.ods");
        std::fs::write(path.path(), "not a workbook").unwrap();

        assert_eq!(ErrorKind::Deserialize, read(path.path()).unwrap_err().kind());
    }
}
