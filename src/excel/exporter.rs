//! Summary exporter - SummaryTable → .xlsx

use crate::error::MrfResult;
use crate::types::{RowValues, SummaryTable};
use rust_xlsxwriter::{DocProperties, Format, FormatAlign, Formula, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

/// Document properties written into the summary file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportMetadata {
    pub title: String,
    pub author: String,
}

/// Writes a [`SummaryTable`] as a single-sheet workbook
pub struct SummaryExporter<'a> {
    table: &'a SummaryTable,
    metadata: ExportMetadata,
}

impl<'a> SummaryExporter<'a> {
    pub fn new(table: &'a SummaryTable, metadata: ExportMetadata) -> Self {
        Self { table, metadata }
    }

    /// Export to an .xlsx file
    pub fn export(&self, output_path: &Path) -> MrfResult<()> {
        let mut workbook = self.build()?;
        workbook.save(output_path)?;
        debug!(path = %output_path.display(), "saved summary");
        Ok(())
    }

    /// Export to an in-memory .xlsx
    pub fn to_buffer(&self) -> MrfResult<Vec<u8>> {
        let mut workbook = self.build()?;
        Ok(workbook.save_to_buffer()?)
    }

    fn build(&self) -> MrfResult<Workbook> {
        let mut workbook = Workbook::new();
        let properties = DocProperties::new()
            .set_title(&self.metadata.title)
            .set_author(&self.metadata.author);
        workbook.set_properties(&properties);

        let worksheet = workbook.add_worksheet();
        self.write_sheet(worksheet)?;
        Ok(workbook)
    }

    fn write_sheet(&self, worksheet: &mut Worksheet) -> MrfResult<()> {
        let table = self.table;
        let header_format = Format::new().set_bold();
        let title_format = Format::new().set_bold().set_align(FormatAlign::Center);
        let value_format = match &table.number_format {
            Some(num_format) => Format::new().set_num_format(num_format),
            None => Format::new(),
        };
        let total_format = value_format.clone().set_bold();
        let last_col = table.column_count().saturating_sub(1) as u16;

        let mut row: u32 = 0;

        // Title row, merged across the table
        if let Some(title) = &table.title {
            if last_col > 0 {
                worksheet.merge_range(0, 0, 0, last_col, title, &title_format)?;
            } else {
                worksheet.write_string_with_format(0, 0, title, &title_format)?;
            }
            row += 1;
        }

        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, header, &header_format)?;
        }
        row += 1;

        for club in &table.rows {
            worksheet.write_string(row, 0, &club.club)?;
            match &club.values {
                RowValues::Feedback(Some(text)) => {
                    worksheet.write_string(row, 1, text)?;
                }
                RowValues::Feedback(None) => {}
                RowValues::Totals(values) => {
                    for (i, value) in values.iter().enumerate() {
                        worksheet.write_number_with_format(
                            row,
                            (i + 1) as u16,
                            *value,
                            &value_format,
                        )?;
                    }
                }
            }
            row += 1;
        }

        if let Some(total) = &table.total {
            worksheet.write_string_with_format(row, 0, &total.label, &header_format)?;
            for (i, formula) in total.formulas.iter().enumerate() {
                worksheet.write_formula_with_format(
                    row,
                    (i + 1) as u16,
                    Formula::new(formula),
                    &total_format,
                )?;
            }
        }

        // Column widths
        worksheet.set_column_width(0, 32)?;
        if table.procedure.has_totals() {
            for col in 1..=last_col {
                worksheet.set_column_width(col, 24)?;
            }
        } else if last_col > 0 {
            worksheet.set_column_width(1, 80)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClubRow, Procedure};
    use chrono::Month;

    fn metadata() -> ExportMetadata {
        ExportMetadata {
            title: "TOTAL HOURS PER TENET".to_string(),
            author: "mrf-parse".to_string(),
        }
    }

    #[test]
    fn test_export_hours_to_buffer() {
        let mut table = SummaryTable::new(Procedure::Hours, Month::May, 2020);
        table.push_row(ClubRow::totals("Lincoln", vec![1.0, 2.0, 3.0]));
        table.append_total_row();

        let buffer = SummaryExporter::new(&table, metadata()).to_buffer().unwrap();
        // .xlsx files are zip archives
        assert_eq!(&buffer[..2], b"PK");
    }

    #[test]
    fn test_export_empty_feedback_table() {
        let table = SummaryTable::new(Procedure::Feedback, Month::May, 2020);
        assert!(SummaryExporter::new(&table, metadata()).to_buffer().is_ok());
    }
}
