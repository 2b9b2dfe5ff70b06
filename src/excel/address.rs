//! A1-style cell addressing
//!
//! Rows and columns are stored zero-based, matching calamine's `(row, col)`
//! positions and rust_xlsxwriter's write API. Display goes back to 1-based A1.

use crate::error::{MrfError, MrfResult};
use std::fmt;
use std::str::FromStr;

/// Largest column Excel supports (XFD)
const MAX_COLUMN: u32 = 16_383;

/// Largest row Excel supports
const MAX_ROW: u32 = 1_048_575;

/// A single cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse `F10`, `$F$10` or `f10`
    pub fn parse(text: &str) -> MrfResult<Self> {
        let invalid = || MrfError::InvalidAddress(text.to_string());
        let trimmed = text.trim();

        let rest = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let letters_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if letters_len == 0 || letters_len > 3 {
            return Err(invalid());
        }
        let (letters, rest) = rest.split_at(letters_len);
        let digits = rest.strip_prefix('$').unwrap_or(rest);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let col = column_letter_to_index(letters).ok_or_else(invalid)?;
        let row_number: u32 = digits.parse().map_err(|_| invalid())?;
        if row_number == 0 || row_number - 1 > MAX_ROW {
            return Err(invalid());
        }

        Ok(Self::new(row_number - 1, col))
    }

    /// Same column, `offset` rows further down
    pub fn down(self, offset: u32) -> Self {
        Self::new(self.row + offset, self.col)
    }

    /// The 1-based row number shown in A1 notation
    pub fn row_number(self) -> u32 {
        self.row + 1
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_index_to_letter(self.col), self.row + 1)
    }
}

impl FromStr for CellRef {
    type Err = MrfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A rectangular region. `end` is `None` when only the start is known, as
/// with a bare cell used as a run anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl CellRange {
    pub fn new(start: CellRef, end: CellRef) -> Self {
        // Normalise reversed corners (`F30:F10`)
        let top_left = CellRef::new(start.row.min(end.row), start.col.min(end.col));
        let bottom_right = CellRef::new(start.row.max(end.row), start.col.max(end.col));
        Self {
            start: top_left,
            end: Some(bottom_right),
        }
    }

    pub fn open(start: CellRef) -> Self {
        Self { start, end: None }
    }

    /// Parse `F10:F30`, `$F$10:$F$30` or a single `F10`
    pub fn parse(text: &str) -> MrfResult<Self> {
        match text.split_once(':') {
            Some((a, b)) => Ok(Self::new(CellRef::parse(a)?, CellRef::parse(b)?)),
            None => Ok(Self::open(CellRef::parse(text)?)),
        }
    }

    /// Last row a run may read, if bounded
    pub fn last_row(&self) -> Option<u32> {
        self.end.map(|end| end.row)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}:{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

/// Convert a column index to Excel column letters
///
/// Examples:
/// - 0 → A
/// - 25 → Z
/// - 26 → AA
pub fn column_index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut idx = index;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Convert Excel column letters to a zero-based index (A→0, AA→26)
pub fn column_letter_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    let index = index - 1;
    (index <= MAX_COLUMN).then_some(index)
}
