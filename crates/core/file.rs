use std::path::{Path, PathBuf};

use bookfill::export::xlsx::DEFAULT_FILE;
use eyre::{eyre, Context, Result};
use glob::{glob, Pattern};
use log::trace;

const SPREADSHEET_EXTS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// The spreadsheet to read: `file` when given, otherwise the only spreadsheet in the current
/// directory.
pub fn input_spreadsheet(file: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = file {
        trace!("'file' option used with value of '{}'", path.display());
        if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(eyre!(
                "No spreadsheet loaded - '{}' does not exist",
                path.display()
            ))
        }
    } else {
        trace!("'file' option not used - searching the current directory for a spreadsheet");
        find_spreadsheet_in_directory(".")
    }
}

fn find_spreadsheet_in_directory<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let path = dir.as_ref();
    if !path.is_dir() {
        return Err(eyre!("Path entered is not a directory"));
    }

    let escaped = Pattern::escape(&path.to_string_lossy());
    let mut found = Vec::new();

    for ext in SPREADSHEET_EXTS {
        let pattern = format!("{escaped}/*.{ext}");
        for entry in glob(&pattern).wrap_err("Invalid spreadsheet search pattern")? {
            let entry = entry
                .wrap_err("Cannot determine a file path - Do you have the correct permissions?")?;
            if is_candidate(&entry) {
                found.push(entry);
            }
        }
    }

    match found.len() {
        0 => Err(eyre!(
            "No spreadsheet loaded - no spreadsheet found in the '{}' directory",
            path.display()
        )),
        1 => Ok(found.remove(0)),
        _ => Err(eyre!(
            "More than one spreadsheet found - use the --file option to select one"
        )),
    }
}

// our own export and office lock files are never inputs
fn is_candidate(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name != DEFAULT_FILE && !name.starts_with("~$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::{
        fixture::{FileTouch, PathChild},
        TempDir,
    };

    #[test]
    #[should_panic(expected = "'no such file.xlsx' does not exist")]
    fn err_when_given_file_does_not_exist() {
        input_spreadsheet(Some(Path::new("no such file.xlsx"))).unwrap();
    }

    #[test]
    fn given_file_is_used_as_is() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        let file = dir.child("stock.ods");
        file.touch().unwrap();

        assert_eq!(file.path(), input_spreadsheet(Some(file.path())).unwrap());
    }

    #[test]
    #[should_panic(expected = "No spreadsheet loaded")]
    fn no_files_in_directory() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");

        find_spreadsheet_in_directory(TempDir::path(&dir)).unwrap();
    }

    #[test]
    #[should_panic(expected = "not a directory")]
    fn path_is_not_a_directory() {
        find_spreadsheet_in_directory("not a directory").unwrap();
    }

    #[test]
    #[should_panic(expected = "More than one spreadsheet")]
    fn multiple_spreadsheets_in_directory() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        dir.child("one.xlsx").touch().unwrap();
        dir.child("two.ods").touch().unwrap();

        find_spreadsheet_in_directory(TempDir::path(&dir)).unwrap();
    }

    #[test]
    fn previous_export_and_lock_files_are_ignored() {
        let dir = TempDir::new().expect("Cannot create temp directory for test");
        dir.child("book_data.xlsx").touch().unwrap();
        dir.child("~$stock.xlsx").touch().unwrap();
        dir.child("notes.txt").touch().unwrap();
        dir.child("stock.xlsx").touch().unwrap();

        let found = find_spreadsheet_in_directory(TempDir::path(&dir)).unwrap();

        assert_eq!(Some(std::ffi::OsStr::new("stock.xlsx")), found.file_name());
    }
}
