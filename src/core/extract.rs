//! Per-file extraction: one MRF workbook → one club row

use crate::core::range_sum::sum_column_run;
use crate::core::reference::{Indirection, ReferenceResolver};
use crate::error::{MrfError, MrfResult};
use crate::excel::{CellRef, Workbook};
use crate::types::{ClubRow, Procedure};
use chrono::Month;
use tracing::debug;

pub const CLUB_SHEET: &str = "Club Administration";
pub const ANNUAL_SHEET: &str = "Annual Totals";

/// Club Administration!A12
pub const CLUB_NAME_CELL: CellRef = CellRef::new(11, 0);

/// <month>!A64
pub const FEEDBACK_CELL: CellRef = CellRef::new(63, 0);

/// Where the twelve month rows and the category columns sit on Annual Totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyLayout {
    /// Zero-based row of the window's first month
    pub first_row: u32,
    /// Column holding the month sheet name on each row
    pub month_column: u32,
    /// One column per output category, in output order
    pub categories: &'static [u32],
    pub indirection: Indirection,
}

/// Rows 39-50; month in C; service F, leadership H, fellowship J
pub const HOURS_LAYOUT: TallyLayout = TallyLayout {
    first_row: 38,
    month_column: 2,
    categories: &[5, 7, 9],
    indirection: Indirection::Single,
};

/// Rows 60-71; month in A; PTP C, Trevor Project E, KFH G, other charities M
pub const FUNDS_LAYOUT: TallyLayout = TallyLayout {
    first_row: 59,
    month_column: 0,
    categories: &[2, 4, 6, 12],
    indirection: Indirection::Double,
};

impl TallyLayout {
    pub fn for_procedure(procedure: Procedure) -> Option<&'static TallyLayout> {
        match procedure {
            Procedure::Feedback => None,
            Procedure::Hours => Some(&HOURS_LAYOUT),
            Procedure::Funds => Some(&FUNDS_LAYOUT),
        }
    }
}

/// The twelve month rows, ordered from the fiscal year's first month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub fiscal_start: Month,
}

impl Default for MonthWindow {
    fn default() -> Self {
        Self {
            fiscal_start: Month::March,
        }
    }
}

impl MonthWindow {
    pub fn new(fiscal_start: Month) -> Self {
        Self { fiscal_start }
    }

    /// 1-based position of `month` inside the window.
    /// For a March start this is `(month + 9) % 12 + 1`.
    pub fn position(&self, month: Month) -> u32 {
        let m = month.number_from_month();
        let s = self.fiscal_start.number_from_month();
        (m + 12 - s) % 12 + 1
    }

    /// All twelve row offsets, starting at `target` and wrapping around
    pub fn rotated(&self, target: Month) -> Vec<u32> {
        let first = self.position(target) - 1;
        (0..12).map(|i| (first + i) % 12).collect()
    }

    /// Row offsets from the fiscal year's first month through `target`
    pub fn through(&self, target: Month) -> Vec<u32> {
        (0..self.position(target)).collect()
    }
}

/// Pulls club rows out of MRF workbooks for a given report month
pub struct Extractor {
    resolver: ReferenceResolver,
    month: Month,
    window: MonthWindow,
    year_to_date: bool,
}

impl Extractor {
    pub fn new(month: Month, window: MonthWindow, year_to_date: bool) -> MrfResult<Self> {
        Ok(Self {
            resolver: ReferenceResolver::new()?,
            month,
            window,
            year_to_date,
        })
    }

    /// Extract the row for `procedure`. `Ok(None)` means the file does not
    /// apply (a feedback MRF without the report month's sheet).
    pub fn extract(&self, procedure: Procedure, workbook: &Workbook) -> MrfResult<Option<ClubRow>> {
        match TallyLayout::for_procedure(procedure) {
            None => self.extract_feedback(workbook),
            Some(layout) => self.extract_tally(workbook, layout).map(Some),
        }
    }

    /// The club's name, blank if the cell is empty
    pub fn club_name(&self, workbook: &Workbook) -> MrfResult<String> {
        Ok(workbook
            .require_sheet(CLUB_SHEET)?
            .text(CLUB_NAME_CELL)
            .unwrap_or_default())
    }

    pub fn extract_feedback(&self, workbook: &Workbook) -> MrfResult<Option<ClubRow>> {
        let Some(month_sheet) = workbook.sheet(self.month.name()) else {
            debug!(
                workbook = %workbook.name(),
                month = self.month.name(),
                "no sheet for report month"
            );
            return Ok(None);
        };

        let club = self.club_name(workbook)?;
        let feedback = month_sheet.text(FEEDBACK_CELL);
        Ok(Some(ClubRow::feedback(club, feedback)))
    }

    pub fn extract_hours(&self, workbook: &Workbook) -> MrfResult<ClubRow> {
        self.extract_tally(workbook, &HOURS_LAYOUT)
    }

    pub fn extract_funds(&self, workbook: &Workbook) -> MrfResult<ClubRow> {
        self.extract_tally(workbook, &FUNDS_LAYOUT)
    }

    /// Sum every category across the month rows of `layout`
    pub fn extract_tally(&self, workbook: &Workbook, layout: &TallyLayout) -> MrfResult<ClubRow> {
        let annual = workbook.require_sheet(ANNUAL_SHEET)?;
        let club = self.club_name(workbook)?;

        let offsets = if self.year_to_date {
            self.window.through(self.month)
        } else {
            self.window.rotated(self.month)
        };

        let mut totals = vec![0.0; layout.categories.len()];
        for offset in offsets {
            let row = layout.first_row + offset;
            let name_at = CellRef::new(row, layout.month_column);
            let month_name = annual.text(name_at).ok_or_else(|| MrfError::MissingCell {
                sheet: annual.name().to_string(),
                cell: name_at.to_string(),
            })?;
            let month_sheet = workbook.require_sheet(&month_name)?;

            for (total, &col) in totals.iter_mut().zip(layout.categories) {
                let found = self.resolver.resolve_total_range(
                    workbook,
                    annual,
                    month_sheet,
                    CellRef::new(row, col),
                    layout.indirection,
                )?;
                let data_sheet = if found.sheet == month_sheet.name() {
                    month_sheet
                } else {
                    workbook.require_sheet(&found.sheet)?
                };
                *total += sum_column_run(data_sheet, found.range);
            }
        }

        debug!(club = %club, totals = ?totals, "extracted totals");
        Ok(ClubRow::totals(club, totals))
    }
}
