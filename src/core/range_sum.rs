//! Column-run summation

use crate::excel::{CellRange, Sheet};

/// Sum the vertical run that starts at `range.start`.
///
/// The run ends at the first row without a cell object, or after the range's
/// last row when the range is bounded. Present-but-empty cells, text, booleans
/// and error values count as zero. Formula cells contribute their cached
/// numeric result.
pub fn sum_column_run(sheet: &Sheet, range: CellRange) -> f64 {
    let last_row = range.last_row().unwrap_or(u32::MAX);
    let mut total = 0.0;
    let mut at = range.start;

    while at.row <= last_row {
        let Some(cell) = sheet.cell(at) else {
            break;
        };
        if let Some(n) = cell.value.as_f64() {
            total += n;
        }
        if at.row == u32::MAX {
            break;
        }
        at = at.down(1);
    }

    total
}
