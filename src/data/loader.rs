use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};

use super::error::{LoadError, ParseCause, Result};
use super::model::{
    canonical_tested, format_number, Field, QualifyingTotal, TidyRecord, TidyTable,
};

const WORKBOOK_EXTENSIONS: [&str; 4] = [".xlsx", ".xlsm", ".xlsb", ".xls"];
const CSV_EXTENSION: &str = ".csv";

/// Text that spreadsheets and CSV exports use for "no value". A total cell
/// holding one of these counts as blank. Categories keep them verbatim.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Source – where a table comes from
// ---------------------------------------------------------------------------

/// A file on disk, or an already-open stream with the name it was given.
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Stream { name: String, bytes: Vec<u8> },
}

impl Source {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    /// Drain `reader` into memory; `name` drives format detection.
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> std::io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Source::Stream {
            name: name.into(),
            bytes,
        })
    }

    pub fn name(&self) -> String {
        match self {
            Source::Path(p) => p.display().to_string(),
            Source::Stream { name, .. } => name.clone(),
        }
    }

    fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Source::Path(p) => std::fs::read(p),
            Source::Stream { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

/// How a source will be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

/// Pick a format from the source name, falling back to "existing file means
/// workbook" for paths with an unrecognised extension.
///
/// `.csv` is checked before that fallback, so an existing CSV file is never
/// handed to the workbook reader.
pub fn detect_format(source: &Source) -> Result<SourceFormat> {
    let name = source.name().to_lowercase();
    if WORKBOOK_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return Ok(SourceFormat::Workbook);
    }
    if name.ends_with(CSV_EXTENSION) {
        return Ok(SourceFormat::Csv);
    }
    match source {
        Source::Path(p) if p.is_file() => Ok(SourceFormat::Workbook),
        _ => Err(LoadError::UnsupportedFormat {
            name: source.name(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a source and reshape it into a [`TidyTable`].
///
/// Workbooks contribute every sheet, in declared order; the first row of a
/// sheet is its header. CSV files are a single such sheet.
pub fn load_table(source: &Source) -> Result<TidyTable> {
    let name = source.name();
    let format = detect_format(source)?;
    let bytes = source.read_bytes().map_err(|e| parse_error(&name, e))?;

    let wide = match format {
        SourceFormat::Workbook => read_workbook(bytes, &name)?,
        SourceFormat::Csv => read_csv(&bytes).map_err(|e| parse_error(&name, e))?,
    };

    let table = melt(&wide, &name)?;
    log::info!(
        "Loaded {name}: {} wide rows, {} columns → {} tidy rows",
        wide.rows.len(),
        wide.columns.len(),
        table.len()
    );
    Ok(table)
}

fn parse_error(name: &str, cause: impl Into<ParseCause>) -> LoadError {
    LoadError::Parse {
        name: name.to_string(),
        source: cause.into(),
    }
}

// ---------------------------------------------------------------------------
// Wide table – sheets concatenated over the union of their columns
// ---------------------------------------------------------------------------

/// A raw cell before it is interpreted as category or total.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
        }
    }
}

/// All rows of all sheets. Every row has one cell per entry of `columns`.
#[derive(Debug, Default)]
pub struct WideTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl WideTable {
    fn column_index(&mut self, header: &str) -> usize {
        match self.columns.iter().position(|c| c == header) {
            Some(i) => i,
            None => {
                self.columns.push(header.to_string());
                self.columns.len() - 1
            }
        }
    }

    /// Append one sheet. Columns are matched by header; new headers extend
    /// the table and earlier rows get empty cells for them. Blank headers
    /// are dropped.
    fn push_sheet<I>(&mut self, headers: &[String], rows: I)
    where
        I: IntoIterator<Item = Vec<Cell>>,
    {
        let targets: Vec<Option<usize>> = headers
            .iter()
            .map(|h| {
                if h.is_empty() {
                    None
                } else {
                    Some(self.column_index(h))
                }
            })
            .collect();

        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, Cell::Empty);
        }

        for cells in rows {
            let mut row = vec![Cell::Empty; width];
            for (cell, target) in cells.into_iter().zip(&targets) {
                if let Some(t) = target {
                    row[*t] = cell;
                }
            }
            self.rows.push(row);
        }
    }
}

// ---------------------------------------------------------------------------
// Workbook reader
// ---------------------------------------------------------------------------

fn read_workbook(bytes: Vec<u8>, name: &str) -> Result<WideTable> {
    let mut workbook: Sheets<_> =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| parse_error(name, e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(LoadError::Empty {
            name: name.to_string(),
        });
    }

    let mut wide = WideTable::default();
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| parse_error(name, e))?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            log::debug!("{name}: sheet '{sheet_name}' is empty, skipped");
            continue;
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|d| cell_from_data(d).text().trim().to_string())
            .collect();

        let data_rows: Vec<Vec<Cell>> = rows
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();
        log::debug!(
            "{name}: sheet '{sheet_name}' has {} rows, headers {headers:?}",
            data_rows.len()
        );
        wide.push_sheet(&headers, data_rows);
    }
    Ok(wide)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Cell::Text(format_number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        // #N/A, #DIV/0! and friends carry no total
        Data::Error(_) => Cell::Empty,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Header row, then one wide row per record. All cells are text; blank
/// fields are empty cells. Rows may be shorter than the header.
fn read_csv(bytes: &[u8]) -> std::result::Result<WideTable, csv::Error> {
    // short rows are padded with blanks by `push_sheet`
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }

    let mut wide = WideTable::default();
    wide.push_sheet(&headers, rows);
    Ok(wide)
}

fn is_missing_marker(cell: &Cell) -> bool {
    match cell {
        Cell::Text(s) => MISSING_MARKERS.contains(&s.trim()),
        Cell::Empty | Cell::Number(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Melt – wide → long
// ---------------------------------------------------------------------------

/// One record per (wide row, weight-class column) with a non-blank total,
/// row by row, columns left to right.
pub fn melt(wide: &WideTable, name: &str) -> Result<TidyTable> {
    let mut fixed: [Option<usize>; 5] = [None; 5];
    let mut weight_columns = Vec::new();

    for (i, header) in wide.columns.iter().enumerate() {
        match Field::from_source_header(header) {
            Some(field) => {
                if let Some(slot) = Field::FIXED.iter().position(|&f| f == field) {
                    fixed[slot].get_or_insert(i);
                }
            }
            None => weight_columns.push(i),
        }
    }

    let missing: Vec<&'static str> = Field::FIXED
        .iter()
        .zip(&fixed)
        .filter(|(_, idx)| idx.is_none())
        .map(|(f, _)| f.header())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::Schema {
            name: name.to_string(),
            missing,
        });
    }
    let fixed: Vec<usize> = fixed.iter().flatten().copied().collect();

    let mut records = Vec::new();
    for row in &wide.rows {
        let category = |slot: usize| row[fixed[slot]].text().trim().to_string();
        for &col in &weight_columns {
            let cell = &row[col];
            if cell.is_blank() || is_missing_marker(cell) {
                continue;
            }
            let qualifying_total_kg = match cell {
                Cell::Number(n) => QualifyingTotal::Kg(*n),
                other => QualifyingTotal::from_text(&other.text()),
            };
            records.push(TidyRecord {
                age_category: category(0),
                sex: category(1),
                event: category(2),
                tested: canonical_tested(&category(3)),
                equipment: category(4),
                weight_class_kg: wide.columns[col].trim().to_string(),
                qualifying_total_kg,
            });
        }
    }
    Ok(TidyTable::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    const CSV: &str = "\
Age Category,Sex,Event,Tested,Equipment,90,100,110+
 24-39 ,Male,SBD,Yes, Raw ,500,,600
24-39,Male,B,no,Single-ply,200,210,
40-44,Male,D,N/A,Raw,, ,
";

    fn csv_source(text: &str) -> Source {
        Source::from_reader("totals.CSV", text.as_bytes()).unwrap()
    }

    #[test]
    fn detects_formats_by_extension() {
        let xlsx = Source::Stream {
            name: "FP.XLSX".into(),
            bytes: vec![],
        };
        assert_eq!(detect_format(&xlsx).unwrap(), SourceFormat::Workbook);
        assert_eq!(detect_format(&csv_source("")).unwrap(), SourceFormat::Csv);
    }

    #[test]
    fn existing_csv_file_is_read_as_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FP.csv");
        std::fs::write(&path, CSV).unwrap();
        let source = Source::path(&path);
        assert_eq!(detect_format(&source).unwrap(), SourceFormat::Csv);
        assert_eq!(load_table(&source).unwrap().len(), 4);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let src = Source::Stream {
            name: "totals.json".into(),
            bytes: vec![],
        };
        assert!(matches!(
            load_table(&src),
            Err(LoadError::UnsupportedFormat { .. })
        ));
        let missing = Source::path("/definitely/not/here/FP");
        assert!(matches!(
            detect_format(&missing),
            Err(LoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn melts_row_major_and_drops_blank_totals() {
        let table = load_table(&csv_source(CSV)).unwrap();
        let rows: Vec<(&str, &str, String)> = table
            .records
            .iter()
            .map(|r| {
                (
                    r.event.as_str(),
                    r.weight_class_kg.as_str(),
                    r.qualifying_total_kg.to_string(),
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                ("SBD", "90", "500".to_string()),
                ("SBD", "110+", "600".to_string()),
                ("B", "90", "200".to_string()),
                ("B", "100", "210".to_string()),
            ]
        );
    }

    #[test]
    fn trims_categories_and_canonicalises_tested() {
        let table = load_table(&csv_source(CSV)).unwrap();
        let first = &table.records[0];
        assert_eq!(first.age_category, "24-39");
        assert_eq!(first.equipment, "Raw");
        assert_eq!(first.tested, "Tested");
        assert_eq!(table.records[2].tested, "Untested");
    }

    #[test]
    fn unrecognised_tested_value_is_kept() {
        let text = "Age Category,Sex,Event,Tested,Equipment,90\n40-44,Male,D, N/A ,Raw,180\n";
        let table = load_table(&csv_source(text)).unwrap();
        assert_eq!(table.records[0].tested, "N/A");
    }

    #[test]
    fn missing_fixed_columns_is_a_schema_error() {
        let text = "Age Category,Sex,Event,90\n24-39,Male,SBD,500\n";
        match load_table(&csv_source(text)) {
            Err(LoadError::Schema { missing, .. }) => {
                assert_eq!(missing, vec!["Tested", "Equipment"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn short_csv_rows_are_padded_with_blanks() {
        let text = "Age Category,Sex,Event,Tested,Equipment,90,100\n24-39,Male,SBD,Yes,Raw,500\n";
        let table = load_table(&csv_source(text)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].weight_class_kg, "90");
        assert_eq!(table.records[0].qualifying_total_kg, QualifyingTotal::Kg(500.0));
    }

    #[test]
    fn missing_value_markers_in_totals_are_dropped() {
        let text = "Age Category,Sex,Event,Tested,Equipment,90,100,110\n\
                    40-44,Male,D,N/A,Raw,#N/A, NA ,TBC\n";
        let table = load_table(&csv_source(text)).unwrap();
        assert_eq!(table.len(), 1);
        let record = &table.records[0];
        assert_eq!(record.weight_class_kg, "110");
        assert_eq!(record.qualifying_total_kg.to_string(), "TBC");
        // only totals are affected
        assert_eq!(record.tested, "N/A");
    }

    #[test]
    fn error_cells_read_as_blank() {
        assert_eq!(cell_from_data(&Data::Error(CellErrorType::NA)), Cell::Empty);
        assert_eq!(cell_from_data(&Data::Error(CellErrorType::Div0)), Cell::Empty);
    }

    #[test]
    fn garbage_workbook_is_a_parse_error() {
        let src = Source::Stream {
            name: "FP.xlsx".into(),
            bytes: b"not a workbook".to_vec(),
        };
        assert!(matches!(load_table(&src), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn sheets_union_columns_in_first_appearance_order() {
        let mut wide = WideTable::default();
        let h1: Vec<String> = ["Sex", "90"].iter().map(|s| s.to_string()).collect();
        let h2: Vec<String> = ["Sex", "", "63"].iter().map(|s| s.to_string()).collect();
        wide.push_sheet(&h1, vec![vec![Cell::Text("Male".into()), Cell::Number(500.0)]]);
        wide.push_sheet(
            &h2,
            vec![vec![
                Cell::Text("Female".into()),
                Cell::Text("ignored".into()),
                Cell::Number(300.0),
            ]],
        );
        assert_eq!(wide.columns, vec!["Sex", "90", "63"]);
        assert_eq!(wide.rows[0][2], Cell::Empty);
        assert_eq!(wide.rows[1][1], Cell::Empty);
        assert_eq!(wide.rows[1][2], Cell::Number(300.0));
    }

    #[test]
    fn non_numeric_total_is_kept_as_text() {
        let text = "Age Category,Sex,Event,Tested,Equipment,90\n24-39,Male,SBD,Yes,Raw,TBC\n";
        let table = load_table(&csv_source(text)).unwrap();
        assert_eq!(
            table.records[0].qualifying_total_kg,
            QualifyingTotal::Text("TBC".into())
        );
    }
}
