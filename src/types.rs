use crate::excel::column_index_to_letter;
use chrono::Month;
use serde::Serialize;

//==============================================================================
// Procedures
//==============================================================================

/// Which summary to build from the MRFs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Procedure {
    /// District board feedback text per club
    #[value(alias = "f")]
    Feedback,
    /// Service, leadership and fellowship hours per club
    #[value(alias = "h")]
    Hours,
    /// Funds raised per charity per club
    #[value(aliases = ["m", "money"])]
    Funds,
}

impl Procedure {
    /// Hours and funds end in a total row; feedback does not
    pub fn has_totals(self) -> bool {
        !matches!(self, Procedure::Feedback)
    }

    /// Merged title row above the header, if the layout has one
    pub fn title(self, month: Month, year: i32) -> Option<String> {
        match self {
            Procedure::Feedback => None,
            Procedure::Hours => Some(format!("TOTAL HOURS AS OF ({} {})", month.name(), year)),
            Procedure::Funds => Some(format!("TOTAL FUNDS AS OF ({} {})", month.name(), year)),
        }
    }

    pub fn headers(self, month: Month, year: i32) -> Vec<String> {
        match self {
            Procedure::Feedback => vec![
                "CLUB NAME".to_string(),
                format!("DISTRICT BOARD FEEDBACK ({} {})", month.name(), year),
            ],
            Procedure::Hours => [
                "CLUB NAME",
                "TOTAL SERVICE HOURS",
                "TOTAL LEADERSHIP HOURS",
                "TOTAL FELLOWSHIP HOURS",
            ]
            .map(String::from)
            .to_vec(),
            Procedure::Funds => ["CLUB NAME", "PTP", "TREVOR PROJECT", "KFH", "OTHER CHARITIES"]
                .map(String::from)
                .to_vec(),
        }
    }

    pub fn total_label(self) -> Option<&'static str> {
        match self {
            Procedure::Feedback => None,
            Procedure::Hours => Some("TOTAL HOURS"),
            Procedure::Funds => Some("TOTAL FUNDS"),
        }
    }

    /// Display format for the value columns
    pub fn number_format(self) -> Option<&'static str> {
        match self {
            Procedure::Feedback => None,
            Procedure::Hours => Some("0.00"),
            Procedure::Funds => Some("$#,##0.00;[Red]-$#,##0.00"),
        }
    }
}

//==============================================================================
// Output naming
//==============================================================================

/// File stems of the three summary outputs. They double as the list of
/// names the aggregator must never read back in as input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub feedback: String,
    pub hours: String,
    pub funds: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            feedback: "DISTRICT BOARD FEEDBACK".to_string(),
            hours: "TOTAL HOURS PER TENET".to_string(),
            funds: "TOTAL FUNDS RAISED PER DFI".to_string(),
        }
    }
}

impl OutputNames {
    pub fn stem(&self, procedure: Procedure) -> &str {
        match procedure {
            Procedure::Feedback => &self.feedback,
            Procedure::Hours => &self.hours,
            Procedure::Funds => &self.funds,
        }
    }

    pub fn file_name(&self, procedure: Procedure) -> String {
        format!("{}.xlsx", self.stem(procedure))
    }

    /// Every output file name, for excluding prior outputs from input scans
    pub fn file_names(&self) -> Vec<String> {
        [Procedure::Feedback, Procedure::Hours, Procedure::Funds]
            .into_iter()
            .map(|p| self.file_name(p))
            .collect()
    }
}

//==============================================================================
// Output table
//==============================================================================

/// What a club contributes to the summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowValues {
    Feedback(Option<String>),
    Totals(Vec<f64>),
}

/// One club's row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubRow {
    pub club: String,
    pub values: RowValues,
}

impl ClubRow {
    pub fn feedback(club: impl Into<String>, feedback: Option<String>) -> Self {
        Self {
            club: club.into(),
            values: RowValues::Feedback(feedback),
        }
    }

    pub fn totals(club: impl Into<String>, totals: Vec<f64>) -> Self {
        Self {
            club: club.into(),
            values: RowValues::Totals(totals),
        }
    }
}

/// The trailing row of SUM formulas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalRow {
    pub label: String,
    pub formulas: Vec<String>,
}

/// The summary sheet: optional title, header, club rows, optional totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub procedure: Procedure,
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<ClubRow>,
    pub total: Option<TotalRow>,
    pub number_format: Option<String>,
}

impl SummaryTable {
    pub fn new(procedure: Procedure, month: Month, year: i32) -> Self {
        Self {
            procedure,
            title: procedure.title(month, year),
            headers: procedure.headers(month, year),
            rows: Vec::new(),
            total: None,
            number_format: procedure.number_format().map(String::from),
        }
    }

    pub fn push_row(&mut self, row: ClubRow) {
        self.rows.push(row);
    }

    /// Title (if any) plus the header row
    pub fn header_row_count(&self) -> u32 {
        self.title.is_some() as u32 + 1
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Append the SUM-formula total row over the data rows. Tables without
    /// club rows get none, since the formula would only cover itself.
    pub fn append_total_row(&mut self) {
        let Some(label) = self.procedure.total_label() else {
            return;
        };
        if self.rows.is_empty() {
            return;
        }

        let first = self.header_row_count() + 1;
        let last = self.header_row_count() + self.rows.len() as u32;
        let formulas = (1..self.column_count() as u32)
            .map(|col| {
                let letter = column_index_to_letter(col);
                format!("=SUM({letter}{first}:{letter}{last})")
            })
            .collect();

        self.total = Some(TotalRow {
            label: label.to_string(),
            formulas,
        });
    }

    /// Column-wise sums of the value columns; what the total row evaluates to
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.column_count().saturating_sub(1)];
        for row in &self.rows {
            if let RowValues::Totals(values) = &row.values {
                for (sum, v) in sums.iter_mut().zip(values) {
                    *sum += v;
                }
            }
        }
        sums
    }
}
