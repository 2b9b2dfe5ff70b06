//! Read-only workbook access - MRF (.xls/.xlsx/.xlsm) → in-memory sheets
//!
//! Each sheet is loaded once with its cached values and its formulas merged
//! into a single [`Cell`]. A cell exists when the sheet's used area covers it,
//! even if it holds nothing; positions past the used area have no cell at all.
//! The range summer relies on that difference.

use crate::error::{MrfError, MrfResult};
use crate::excel::address::{CellRange, CellRef};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Cached value of a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Error(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
        }
    }
}

/// One cell: cached value plus the formula that produced it, if any.
/// Formulas are stored with their leading `=`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub formula: Option<String>,
}

impl Cell {
    pub fn empty() -> Self {
        Self {
            value: CellValue::Empty,
            formula: None,
        }
    }

    pub fn formula(formula: impl Into<String>) -> Self {
        Self::empty().with_formula(formula)
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        let formula = formula.into();
        self.formula = if formula.is_empty() {
            None
        } else if formula.starts_with('=') {
            Some(formula)
        } else {
            // calamine strips the leading '='
            Some(format!("={}", formula))
        };
        self
    }

    /// Text that may encode a reference: the formula when the cell has one,
    /// otherwise a text value.
    pub fn reference_text(&self) -> Option<&str> {
        match (&self.formula, &self.value) {
            (Some(formula), _) => Some(formula.as_str()),
            (None, CellValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Display text of the cached value. `None` for empty cells.
    pub fn text(&self) -> Option<String> {
        match &self.value {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            CellValue::Error(e) => Some(e.clone()),
        }
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        Self {
            value,
            formula: None,
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        CellValue::Text(text.to_string()).into()
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        CellValue::Number(n).into()
    }
}

/// Format a number for display, removing unnecessary decimal places
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A worksheet loaded into memory
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    cells: HashMap<CellRef, Cell>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, at: CellRef, cell: impl Into<Cell>) {
        self.cells.insert(at, cell.into());
    }

    /// Builder form of [`Sheet::insert`]
    pub fn with(mut self, at: CellRef, cell: impl Into<Cell>) -> Self {
        self.insert(at, cell);
        self
    }

    /// The cell object at `at`, or `None` past the used area
    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    /// Like [`Sheet::cell`], but a missing cell is an error
    pub fn require_cell(&self, at: CellRef) -> MrfResult<&Cell> {
        self.cell(at).ok_or_else(|| MrfError::MissingCell {
            sheet: self.name.clone(),
            cell: at.to_string(),
        })
    }

    /// Display text at `at`; `None` when the cell is absent or empty
    pub fn text(&self, at: CellRef) -> Option<String> {
        self.cell(at).and_then(Cell::text)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Build a sheet from calamine's value and formula ranges
    fn from_ranges(name: &str, values: &Range<Data>, formulas: Option<&Range<String>>) -> Self {
        let mut sheet = Sheet::new(name);

        if let Some((row0, col0)) = values.start() {
            for (row, col, data) in values.cells() {
                let at = CellRef::new(row0 + row as u32, col0 + col as u32);
                sheet.insert(at, CellValue::from(data));
            }
        }

        if let Some(formulas) = formulas {
            if let Some((row0, col0)) = formulas.start() {
                for (row, col, formula) in formulas.cells() {
                    if formula.is_empty() {
                        continue;
                    }
                    let at = CellRef::new(row0 + row as u32, col0 + col as u32);
                    let cell = sheet.cells.remove(&at).unwrap_or_else(Cell::empty);
                    sheet.insert(at, cell.with_formula(formula.clone()));
                }
            }
        }

        sheet
    }
}

/// A structured table (ListObject) defined in an xlsx workbook
#[derive(Debug, Clone, PartialEq)]
pub struct TableRegion {
    pub name: String,
    pub sheet: String,
    pub columns: Vec<String>,
    /// Data body, excluding the header row. `None` for an empty table.
    pub body: Option<CellRange>,
}

impl TableRegion {
    /// The data body of one column, matched case-insensitively
    pub fn column_range(&self, column: &str) -> Option<CellRange> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(column.trim()))? as u32;
        let body = self.body?;
        let end = body.end.unwrap_or(body.start);
        Some(CellRange::new(
            CellRef::new(body.start.row, body.start.col + idx),
            CellRef::new(end.row, body.start.col + idx),
        ))
    }
}

/// An input workbook with every sheet loaded
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    name: String,
    sheets: Vec<Sheet>,
    defined_names: Vec<(String, String)>,
    tables: Vec<TableRegion>,
}

impl Workbook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Open an .xls/.xlsx/.xlsm file and load all of its sheets
    pub fn open<P: AsRef<Path>>(path: P) -> MrfResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut reader = open_workbook_auto(path)
            .map_err(|e| MrfError::Workbook(format!("Failed to open {}: {}", name, e)))?;

        let mut workbook = Workbook::new(name);
        workbook.defined_names = reader.defined_names().to_vec();

        for sheet_name in reader.sheet_names() {
            let values = reader.worksheet_range(&sheet_name).map_err(|e| {
                MrfError::Workbook(format!(
                    "Failed to read sheet '{}' in {}: {}",
                    sheet_name, workbook.name, e
                ))
            })?;
            // Not every format exposes formulas; fall back to values only
            let formulas = reader.worksheet_formula(&sheet_name).ok();
            workbook.add_sheet(Sheet::from_ranges(&sheet_name, &values, formulas.as_ref()));
        }

        workbook.tables = load_tables(&mut reader);
        debug!(
            workbook = %workbook.name,
            sheets = workbook.sheets.len(),
            tables = workbook.tables.len(),
            "loaded workbook"
        );

        Ok(workbook)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.add_sheet(sheet);
        self
    }

    pub fn add_defined_name(&mut self, name: impl Into<String>, formula: impl Into<String>) {
        self.defined_names.push((name.into(), formula.into()));
    }

    pub fn add_table(&mut self, table: TableRegion) {
        self.tables.push(table);
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Look up a sheet by exact name, then ignoring surrounding whitespace
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .or_else(|| self.sheets.iter().find(|s| s.name.trim() == name.trim()))
    }

    pub fn require_sheet(&self, name: &str) -> MrfResult<&Sheet> {
        self.sheet(name).ok_or_else(|| MrfError::MissingSheet {
            workbook: self.name.clone(),
            sheet: name.to_string(),
        })
    }

    /// The formula text behind a workbook-level defined name
    pub fn defined_name(&self, name: &str) -> Option<&str> {
        self.defined_names
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, formula)| formula.as_str())
    }

    pub fn table(&self, name: &str) -> Option<&TableRegion> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Collect table definitions. Only xlsx-family workbooks carry them; a
/// workbook whose tables cannot be read simply has none.
fn load_tables(reader: &mut Sheets<BufReader<File>>) -> Vec<TableRegion> {
    let Sheets::Xlsx(xlsx) = reader else {
        return Vec::new();
    };
    if let Err(e) = xlsx.load_tables() {
        debug!("no table definitions: {}", e);
        return Vec::new();
    }

    let names: Vec<String> = xlsx.table_names().into_iter().cloned().collect();
    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        match xlsx.table_by_name(&name) {
            Ok(table) => {
                let data = table.data();
                let body = data
                    .start()
                    .zip(data.end())
                    .map(|(start, end)| CellRange::new(CellRef::new(start.0, start.1), CellRef::new(end.0, end.1)));
                tables.push(TableRegion {
                    name: table.name().to_string(),
                    sheet: table.sheet_name().to_string(),
                    columns: table.columns().to_vec(),
                    body,
                });
            }
            Err(e) => debug!(table = %name, "skipping unreadable table: {}", e),
        }
    }
    tables
}
