//! Indirection strings stored in MRF cells
//!
//! The Annual Totals sheet does not hold numbers. Its cells hold formulas that
//! point into a month sheet, which in turn point at the data. Three small
//! grammars cover every level:
//!
//! ```text
//! sheet-reference  := "=" sheet "!" cell          ='January'!$F$80
//! cell-pointer     := "=" cell                     =F90
//! range-descriptor := "=SUM(" region ")"           =SUM(F10:F30)
//!                   | "=" bare-region              =Tenets[ServiceHours]
//! region           := [sheet "!"] cell [":" cell]  F10:F30, January!F10
//!                   | bare-region
//! bare-region      := [sheet "!"] cell ":" cell    F10:F30
//!                   | table "[" column "]"         Tenets[ServiceHours]
//!                   | defined-name                 ServiceHours
//! ```
//!
//! A bare `=F90` is a cell pointer, never a range descriptor. Tables and
//! defined names carry their own sheet; plain cells default to the sheet the
//! descriptor sits on.
//!
//! Hours use one level (`sheet-reference` → `range-descriptor`); funds use two
//! (`sheet-reference` → `cell-pointer` → `range-descriptor`).

use crate::error::{MrfError, MrfResult};
use crate::excel::{CellRange, CellRef, Sheet, Workbook};
use regex::Regex;
use tracing::debug;

/// How many hops separate an Annual Totals cell from its range descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirection {
    /// sheet-reference → range-descriptor (hours)
    Single,
    /// sheet-reference → cell-pointer → range-descriptor (funds)
    Double,
}

/// A parsed `=Sheet!Cell` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetReference {
    pub sheet: String,
    pub cell: CellRef,
}

/// The region named by a range descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// `sheet` is `None` when the cells are unqualified
    Cells {
        sheet: Option<String>,
        range: CellRange,
    },
    Structured { table: String, column: String },
    Named(String),
}

/// A resolved data range and the sheet it lives on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: String,
    pub range: CellRange,
}

/// Parses the reference grammars and follows them through a workbook
pub struct ReferenceResolver {
    sum_pattern: Regex,
    structured_pattern: Regex,
    name_pattern: Regex,
}

impl ReferenceResolver {
    pub fn new() -> MrfResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| MrfError::Config(format!("Regex error: {}", e)))
        };
        Ok(Self {
            sum_pattern: compile(r"(?i)^=\s*SUM\s*\(\s*(.+?)\s*\)$")?,
            structured_pattern: compile(r"^([A-Za-z_\\][\w.]*)\[\[?\s*([^\[\]]+?)\s*\]?\]$")?,
            name_pattern: compile(r"^[A-Za-z_\\][\w.]*$")?,
        })
    }

    /// Parse `=Sheet!F80`, `='Sheet Name'!$F$80` or `Sheet!F80`
    pub fn parse_sheet_reference(&self, location: &str, text: &str) -> MrfResult<SheetReference> {
        let malformed = || MrfError::MalformedReference {
            location: location.to_string(),
            expected: "a sheet reference like =January!F80",
            found: text.to_string(),
        };

        let body = text.trim();
        let body = body.strip_prefix('=').unwrap_or(body).trim();
        let (sheet, cell) = body.rsplit_once('!').ok_or_else(malformed)?;
        let sheet = unquote_sheet(sheet.trim());
        if sheet.is_empty() {
            return Err(malformed());
        }
        let cell = CellRef::parse(cell).map_err(|_| malformed())?;

        Ok(SheetReference { sheet, cell })
    }

    /// Parse `=F90`
    pub fn parse_cell_pointer(&self, location: &str, text: &str) -> MrfResult<CellRef> {
        let malformed = || MrfError::MalformedReference {
            location: location.to_string(),
            expected: "a cell pointer like =F90",
            found: text.to_string(),
        };

        let body = text.trim().strip_prefix('=').ok_or_else(malformed)?;
        CellRef::parse(body).map_err(|_| malformed())
    }

    /// Parse `=SUM(<region>)` or a bare `=<region>`
    pub fn parse_range_descriptor(&self, location: &str, text: &str) -> MrfResult<Region> {
        let malformed = || MrfError::MalformedReference {
            location: location.to_string(),
            expected: "a range formula like =SUM(F10:F30) or =Tenets[ServiceHours]",
            found: text.to_string(),
        };

        let body = text.trim();
        if let Some(captures) = self.sum_pattern.captures(body) {
            let inner = captures.get(1).map(|m| m.as_str()).ok_or_else(malformed)?;
            return self.parse_region(inner, true).ok_or_else(malformed);
        }

        let bare = body.strip_prefix('=').ok_or_else(malformed)?.trim();
        self.parse_region(bare, false).ok_or_else(malformed)
    }

    /// A single cell is a region only inside `SUM(...)`; bare, it is a pointer
    fn parse_region(&self, text: &str, allow_single_cell: bool) -> Option<Region> {
        let (sheet, cells) = match text.rsplit_once('!') {
            Some((sheet, rest)) => (Some(unquote_sheet(sheet.trim())), rest.trim()),
            None => (None, text),
        };

        if let Ok(range) = CellRange::parse(cells) {
            if range.end.is_none() && !allow_single_cell {
                return None;
            }
            return Some(Region::Cells { sheet, range });
        }
        // Tables and names know their own sheet; a qualifier adds nothing
        if let Some(caps) = self.structured_pattern.captures(cells) {
            return Some(Region::Structured {
                table: caps[1].to_string(),
                column: caps[2].to_string(),
            });
        }
        if self.name_pattern.is_match(cells) {
            return Some(Region::Named(cells.to_string()));
        }
        None
    }

    /// Turn a region into concrete cells on the sheet that owns them.
    /// Unqualified cells belong to `home`.
    pub fn resolve_region(
        &self,
        workbook: &Workbook,
        region: &Region,
        home: &str,
    ) -> MrfResult<SheetRange> {
        match region {
            Region::Cells { sheet, range } => Ok(SheetRange {
                sheet: sheet.clone().unwrap_or_else(|| home.to_string()),
                range: *range,
            }),
            Region::Structured { table, column } => {
                let qualified = format!("{}[{}]", table, column);
                let found = workbook
                    .table(table)
                    .ok_or_else(|| MrfError::UnknownName(qualified.clone()))?;
                let range = found
                    .column_range(column)
                    .ok_or(MrfError::UnknownName(qualified))?;
                Ok(SheetRange {
                    sheet: found.sheet.clone(),
                    range,
                })
            }
            Region::Named(name) => {
                let target = workbook
                    .defined_name(name)
                    .ok_or_else(|| MrfError::UnknownName(name.clone()))?;
                let target = target.trim().trim_start_matches('=');
                let (sheet, cells) = match target.rsplit_once('!') {
                    Some((sheet, cells)) => (unquote_sheet(sheet.trim()), cells),
                    None => (home.to_string(), target),
                };
                let range = CellRange::parse(cells).map_err(|_| MrfError::MalformedReference {
                    location: format!("defined name {}", name),
                    expected: "a cell range like Sheet!$F$10:$F$30",
                    found: target.to_string(),
                })?;
                Ok(SheetRange { sheet, range })
            }
        }
    }

    /// Follow the indirection stored at `at` on the Annual Totals sheet down
    /// to the data range. Descriptors are read from `month`; the range may
    /// live on another sheet when it comes from a table or defined name.
    pub fn resolve_total_range(
        &self,
        workbook: &Workbook,
        annual: &Sheet,
        month: &Sheet,
        at: CellRef,
        indirection: Indirection,
    ) -> MrfResult<SheetRange> {
        let annual_location = format!("{}!{}", annual.name(), at);
        let reference = self.parse_sheet_reference(
            &annual_location,
            reference_text(annual, at)?,
        )?;

        let descriptor_at = match indirection {
            Indirection::Single => reference.cell,
            Indirection::Double => {
                let location = format!("{}!{}", month.name(), reference.cell);
                self.parse_cell_pointer(&location, reference_text(month, reference.cell)?)?
            }
        };

        let location = format!("{}!{}", month.name(), descriptor_at);
        let region = self.parse_range_descriptor(&location, reference_text(month, descriptor_at)?)?;
        let found = self.resolve_region(workbook, &region, month.name())?;

        debug!(
            from = %annual_location,
            via = %reference.sheet,
            sheet = %found.sheet,
            range = %found.range,
            "resolved total range"
        );
        Ok(found)
    }
}

/// The reference text at `at`, with absent and non-text cells as errors
fn reference_text(sheet: &Sheet, at: CellRef) -> MrfResult<&str> {
    let cell = sheet.require_cell(at)?;
    cell.reference_text().ok_or_else(|| MrfError::MalformedReference {
        location: format!("{}!{}", sheet.name(), at),
        expected: "a formula or reference text",
        found: cell.text().unwrap_or_default(),
    })
}

/// `'Jan ''24'` → `Jan '24`
fn unquote_sheet(sheet: &str) -> String {
    match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => sheet.to_string(),
    }
}
