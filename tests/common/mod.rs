//! MRF fixture builder shared by the integration tests
//!
//! Writes real .xlsx files with rust_xlsxwriter, laid out the way MRFs are:
//! Annual Totals rows point at month sheets, which point at SUM ranges.

#![allow(dead_code)]

use chrono::Month;
use rust_xlsxwriter::{Formula, Workbook};
use std::path::Path;

/// Month sheets in Annual Totals row order (fiscal year starting March)
pub const FISCAL_MONTHS: [Month; 12] = [
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
    Month::January,
    Month::February,
];

/// What one club reports every month
#[derive(Debug, Clone)]
pub struct MrfFixture {
    pub club: String,
    /// Service, leadership, fellowship hours per month
    pub hours: [f64; 3],
    /// PTP, Trevor Project, KFH, other charities per month
    pub funds: [f64; 4],
    /// Feedback text placed in A64 of every month sheet
    pub feedback: Option<String>,
    /// Month sheet left out of the workbook
    pub omit_month: Option<Month>,
    pub include_annual_totals: bool,
}

impl MrfFixture {
    pub fn new(club: &str) -> Self {
        Self {
            club: club.to_string(),
            hours: [2.0, 1.0, 0.5],
            funds: [10.0, 5.0, 2.5, 1.0],
            feedback: None,
            omit_month: None,
            include_annual_totals: true,
        }
    }

    pub fn hours(mut self, service: f64, leadership: f64, fellowship: f64) -> Self {
        self.hours = [service, leadership, fellowship];
        self
    }

    pub fn funds(mut self, ptp: f64, trevor: f64, kfh: f64, other: f64) -> Self {
        self.funds = [ptp, trevor, kfh, other];
        self
    }

    pub fn feedback(mut self, text: &str) -> Self {
        self.feedback = Some(text.to_string());
        self
    }

    pub fn without_month(mut self, month: Month) -> Self {
        self.omit_month = Some(month);
        self
    }

    pub fn without_annual_totals(mut self) -> Self {
        self.include_annual_totals = false;
        self
    }

    /// Twelve months of each hours category
    pub fn yearly_hours(&self) -> Vec<f64> {
        self.hours.iter().map(|h| h * 12.0).collect()
    }

    /// Twelve months of each funds category
    pub fn yearly_funds(&self) -> Vec<f64> {
        self.funds.iter().map(|f| f * 12.0).collect()
    }
}

const HOURS_COLUMNS: [&str; 3] = ["F", "H", "J"];
const FUNDS_COLUMNS: [&str; 4] = ["C", "E", "G", "M"];

fn cell(address: &str) -> (u32, u16) {
    let split = address.find(|c: char| c.is_ascii_digit()).unwrap();
    let (letters, digits) = address.split_at(split);
    let col = letters
        .bytes()
        .fold(0u32, |acc, b| acc * 26 + (b - b'A' + 1) as u32)
        - 1;
    (digits.parse::<u32>().unwrap() - 1, col as u16)
}

/// Write one MRF workbook to `path`
pub fn write_mrf(path: &Path, mrf: &MrfFixture) {
    let mut workbook = Workbook::new();

    let admin = workbook.add_worksheet();
    admin.set_name("Club Administration").unwrap();
    admin.write_string(0, 0, "CLUB ADMINISTRATION").unwrap();
    admin.write_string(11, 0, &mrf.club).unwrap();

    for month in FISCAL_MONTHS {
        if mrf.omit_month == Some(month) {
            continue;
        }
        let sheet = workbook.add_worksheet();
        sheet.set_name(month.name()).unwrap();

        // Hours: F80 =SUM(F10:F29), entries split over two rows
        for (i, letter) in HOURS_COLUMNS.iter().enumerate() {
            let (row, col) = cell(&format!("{letter}80"));
            sheet
                .write_formula(row, col, Formula::new(format!("=SUM({letter}10:{letter}29)")))
                .unwrap();
            let half = mrf.hours[i] / 2.0;
            let (row, col) = cell(&format!("{letter}10"));
            sheet.write_number(row, col, half).unwrap();
            sheet.write_number(row + 1, col, half).unwrap();
        }

        // Funds: C5 =C90, C90 =SUM(C70:C85)
        for (i, letter) in FUNDS_COLUMNS.iter().enumerate() {
            let (row, col) = cell(&format!("{letter}5"));
            sheet
                .write_formula(row, col, Formula::new(format!("={letter}90")))
                .unwrap();
            let (row, col) = cell(&format!("{letter}90"));
            sheet
                .write_formula(row, col, Formula::new(format!("=SUM({letter}70:{letter}85)")))
                .unwrap();
            let (row, col) = cell(&format!("{letter}70"));
            sheet.write_number(row, col, mrf.funds[i]).unwrap();
        }

        if let Some(text) = &mrf.feedback {
            sheet
                .write_string(63, 0, format!("{}: {}", month.name(), text))
                .unwrap();
        }
    }

    if mrf.include_annual_totals {
        let annual = workbook.add_worksheet();
        annual.set_name("Annual Totals").unwrap();

        for (i, month) in FISCAL_MONTHS.iter().enumerate() {
            let name = month.name();

            let hours_row = 38 + i as u32;
            annual.write_string(hours_row, 2, name).unwrap();
            for letter in HOURS_COLUMNS {
                let (_, col) = cell(&format!("{letter}1"));
                annual
                    .write_formula(hours_row, col, Formula::new(format!("='{name}'!{letter}80")))
                    .unwrap();
            }

            let funds_row = 59 + i as u32;
            annual.write_string(funds_row, 0, name).unwrap();
            for letter in FUNDS_COLUMNS {
                let (_, col) = cell(&format!("{letter}1"));
                annual
                    .write_formula(funds_row, col, Formula::new(format!("={name}!{letter}5")))
                    .unwrap();
            }
        }
    }

    workbook.save(path).unwrap();
}
