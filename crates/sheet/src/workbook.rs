use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::table::SheetTable;
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// An open workbook plus the modification time it was opened at.
///
/// Any format calamine detects (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`)
/// works. Dropping the handle releases the underlying file.
pub struct WorkbookHandle {
    path: PathBuf,
    modified: SystemTime,
    sheet_names: Vec<String>,
    sheets: Sheets<BufReader<File>>,
}

impl std::fmt::Debug for WorkbookHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookHandle")
            .field("path", &self.path)
            .field("modified", &self.modified)
            .field("sheet_names", &self.sheet_names)
            .finish_non_exhaustive()
    }
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel serial date; header labels are never stored this way
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Expand a calamine range into absolute, row-major cells.
///
/// calamine trims leading empty rows and columns; they are padded back so
/// that column indices match the sheet's own lettering.
pub(crate) fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let (row_offset, col_offset) = range
        .start()
        .map_or((0, 0), |(row, col)| (row as usize, col as usize));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![CellValue::Null; col_offset];
        cells.extend(row.iter().map(data_to_cell_value));
        rows.push(cells);
    }
    rows
}

impl WorkbookHandle {
    /// Open a workbook, recording its current modification time
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or cannot be decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let modified = std::fs::metadata(path)?.modified()?;
        let sheets = open_workbook_auto(path).map_err(|e| SheetError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let sheet_names = sheets.sheet_names().iter().map(ToString::to_string).collect();

        Ok(WorkbookHandle {
            path: path.to_path_buf(),
            modified,
            sheet_names,
            sheets,
        })
    }

    /// Path the workbook was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time observed when the workbook was opened
    #[must_use]
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Actual sheet names in workbook order
    #[must_use]
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Load one sheet by its actual name
    ///
    /// # Errors
    ///
    /// Returns error if the sheet does not exist or cannot be decoded.
    pub fn load_table(&mut self, sheet_name: &str) -> Result<SheetTable> {
        let range = self
            .sheets
            .worksheet_range(sheet_name)
            .map_err(|e| SheetError::SheetRead {
                path: self.path.clone(),
                sheet: sheet_name.to_string(),
                message: e.to_string(),
            })?;

        Ok(SheetTable::from_rows(sheet_name, range_to_rows(&range)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_load_preserves_offsets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("고용률").unwrap();
        // First used cell is C3
        worksheet.write_string(2, 2, "2025.2/4").unwrap();
        worksheet.write_number(3, 2, 61.5).unwrap();
        workbook.save(&path).unwrap();

        let mut handle = WorkbookHandle::open(&path).unwrap();
        assert_eq!(handle.sheet_names(), ["고용률".to_string()]);

        let table = handle.load_table("고용률").unwrap();
        assert_eq!(table.name(), "고용률");
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.cell(2, 2), &CellValue::String("2025.2/4".to_string()));
        assert_eq!(table.cell(3, 2).as_number(), Some(61.5));
        assert_eq!(table.cell(0, 0), &CellValue::Null);
    }

    #[test]
    fn test_open_missing_file() {
        let result = WorkbookHandle::open("/non/existent/workbook.xlsx");
        assert!(matches!(result, Err(SheetError::Io(_))));
    }

    #[test]
    fn test_load_unknown_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.xlsx");

        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("Data").unwrap();
        workbook.save(&path).unwrap();

        let mut handle = WorkbookHandle::open(&path).unwrap();
        assert!(matches!(
            handle.load_table("Missing"),
            Err(SheetError::SheetRead { .. })
        ));
    }
}
