use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{open_workbook_auto, Data, Ods, Range, Reader, Xls, Xlsb, Xlsx};

use super::error::LoadError;
use super::model::{Cell, RawSheet};

// ---------------------------------------------------------------------------
// Tabular reader capability
// ---------------------------------------------------------------------------

/// Anything that can produce the raw cell grid of a single-sheet report.
pub trait TabularReader {
    /// Name used in diagnostics and log lines.
    fn source_name(&self) -> String;

    /// Read every row of the (first) sheet.
    fn read_sheet(&self) -> Result<RawSheet, LoadError>;
}

impl TabularReader for RawSheet {
    fn source_name(&self) -> String {
        "in-memory sheet".to_string()
    }

    fn read_sheet(&self) -> Result<RawSheet, LoadError> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Report sources: a path on disk or bytes already in memory
// ---------------------------------------------------------------------------

/// File formats the loader understands, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xlsx,
    Xlsb,
    Xls,
    Ods,
    Csv,
}

impl Format {
    pub const EXTENSIONS: [&'static str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

    /// Detect the format from a file name.  No extension means `.xlsx`.
    pub fn from_name(name: &str) -> Option<Format> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            None | Some("xlsx") | Some("xlsm") => Some(Format::Xlsx),
            Some("xlsb") => Some(Format::Xlsb),
            Some("xls") => Some(Format::Xls),
            Some("ods") => Some(Format::Ods),
            Some("csv") => Some(Format::Csv),
            Some(_) => None,
        }
    }
}

/// Where a report comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    File(PathBuf),
    /// Workbook or CSV content already loaded; `name` picks the format.
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl ReportSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ReportSource::File(path.into())
    }

    pub fn bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        ReportSource::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    fn format(&self) -> Result<Format, LoadError> {
        let name = match self {
            ReportSource::File(path) => path.to_string_lossy().into_owned(),
            ReportSource::Bytes { name, .. } => name.clone(),
        };
        Format::from_name(&name)
            .ok_or_else(|| LoadError::unavailable(self.source_name(), "unsupported file extension"))
    }
}

impl fmt::Display for ReportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSource::File(path) => write!(f, "{}", path.display()),
            ReportSource::Bytes { name, .. } => write!(f, "{name} (in memory)"),
        }
    }
}

impl TabularReader for ReportSource {
    fn source_name(&self) -> String {
        self.to_string()
    }

    fn read_sheet(&self) -> Result<RawSheet, LoadError> {
        let name = self.source_name();
        let format = self.format()?;
        log::debug!("Reading {name} as {format:?}");

        match (self, format) {
            (ReportSource::File(path), Format::Csv) => {
                let reader = csv::ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_path(path)
                    .map_err(|e| LoadError::unavailable(&name, e))?;
                read_csv(reader, &name)
            }
            (ReportSource::File(path), _) => {
                let mut workbook =
                    open_workbook_auto(path).map_err(|e| LoadError::unavailable(&name, e))?;
                first_sheet(&mut workbook, &name)
            }
            (ReportSource::Bytes { bytes, .. }, Format::Csv) => {
                let reader = csv::ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(bytes.as_ref());
                read_csv(reader, &name)
            }
            (ReportSource::Bytes { bytes, .. }, format) => {
                let cursor = Cursor::new(bytes.to_vec());
                match format {
                    Format::Xlsb => open_and_read::<Xlsb<_>>(cursor, &name),
                    Format::Xls => open_and_read::<Xls<_>>(cursor, &name),
                    Format::Ods => open_and_read::<Ods<_>>(cursor, &name),
                    _ => open_and_read::<Xlsx<_>>(cursor, &name),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Workbook helpers (calamine)
// ---------------------------------------------------------------------------

fn open_and_read<R>(cursor: Cursor<Vec<u8>>, name: &str) -> Result<RawSheet, LoadError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: fmt::Display,
{
    let mut workbook = R::new(cursor).map_err(|e| LoadError::unavailable(name, e))?;
    first_sheet(&mut workbook, name)
}

/// Read the first worksheet of an opened workbook.
fn first_sheet<RS, R>(workbook: &mut R, name: &str) -> Result<RawSheet, LoadError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: fmt::Display,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::unavailable(name, "workbook contains no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::unavailable(name, format!("sheet '{sheet_name}': {e}")))?;

    Ok(range_to_sheet(&range))
}

/// calamine trims leading empty rows/columns; put them back so row
/// positions match what the spreadsheet shows.
fn range_to_sheet(range: &Range<Data>) -> RawSheet {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(cell_from_data));
        rows.push(cells);
    }
    RawSheet::new(rows)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV helpers
// ---------------------------------------------------------------------------

/// CSV exports keep the report preamble, so there is no header row here:
/// every line is data, just like a worksheet.
fn read_csv<R: Read>(mut reader: csv::Reader<R>, name: &str) -> Result<RawSheet, LoadError> {
    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| LoadError::unavailable(name, format!("CSV line {}: {e}", line + 1)))?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }
    Ok(RawSheet::new(rows))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_name("dimensionamento.xlsx"), Some(Format::Xlsx));
        assert_eq!(Format::from_name("REPORT.CSV"), Some(Format::Csv));
        assert_eq!(Format::from_name("report.ods"), Some(Format::Ods));
        assert_eq!(Format::from_name("report"), Some(Format::Xlsx));
        assert_eq!(Format::from_name("report.pdf"), None);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = ReportSource::file("/definitely/not/here.xlsx")
            .read_sheet()
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn unknown_extension_is_unavailable() {
        let err = ReportSource::bytes("report.pdf", b"%PDF".to_vec())
            .read_sheet()
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn corrupt_workbook_bytes_are_unavailable() {
        let err = ReportSource::bytes("report.xlsx", b"not a zip archive".to_vec())
            .read_sheet()
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn csv_rows_keep_ragged_lengths() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Sizing report").unwrap();
        writeln!(file, "Ano,Mês,Economia").unwrap();
        writeln!(file, "1,Jan,70.5").unwrap();
        file.flush().unwrap();

        let sheet = ReportSource::file(file.path()).read_sheet().unwrap();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.rows[0], vec![Cell::Text("Sizing report".into())]);
        assert_eq!(
            sheet.rows[2],
            vec![Cell::Number(1.0), Cell::Text("Jan".into()), Cell::Number(70.5)]
        );
    }

    #[test]
    fn workbook_bytes_keep_leading_blank_rows() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 1, "Month").unwrap();
        sheet.write_number(3, 1, 42.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let raw = ReportSource::bytes("report.xlsx", bytes).read_sheet().unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(raw.rows[2][1], Cell::Text("Month".into()));
        assert_eq!(raw.rows[3][1], Cell::Number(42.0));
        assert_eq!(raw.rows[3][0], Cell::Empty);
    }

    #[test]
    fn date_cells_read_as_serial_numbers() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let date = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        sheet.write_number_with_format(0, 0, 45292.0, &date).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let raw = ReportSource::bytes("report.xlsx", bytes).read_sheet().unwrap();
        assert_eq!(raw.rows[0][0], Cell::Number(45292.0));
        assert_eq!(raw.rows[0][0].to_string(), "45292");
    }
}
