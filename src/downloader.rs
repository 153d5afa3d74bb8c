#![cfg(not(tarpaulin_include))]

use crate::error::ExportError;
use crate::record::{REQUIRED_COLUMNS, SalesRecord};

/// File formats the filtered view can be downloaded as
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Parse the `format` query value, case-insensitively
    pub fn parse(value: &str) -> Result<Self, ExportError> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "filtered_sales.csv",
            ExportFormat::Xlsx => "filtered_sales.xlsx",
        }
    }
}

fn date_text(record: &SalesRecord) -> String {
    record.date.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Write rows to CSV with the required columns as header
///
/// Absent products and sales become empty cells, so the output uploads again
/// unchanged.
///
/// # Examples
/// ```
/// use sales_dashboard::downloader::to_csv;
///
/// let csv = to_csv(&[]).unwrap();
/// assert_eq!(csv, "Date,Region,Product,Sales,Category\n");
/// ```
pub fn to_csv(rows: &[&SalesRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REQUIRED_COLUMNS)?;

    for record in rows {
        writer.write_record([
            date_text(record),
            record.region.clone(),
            record.product.clone().unwrap_or_default(),
            record.sales.map(|s| s.to_string()).unwrap_or_default(),
            record.category.clone(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write rows to an XLSX workbook held in memory
///
/// Dates are written as text in the same layout the CSV export uses; sales are
/// written as numbers.
#[cfg(feature = "web")]
pub fn to_xlsx(rows: &[&SalesRecord]) -> Result<Vec<u8>, ExportError> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in REQUIRED_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (idx, record) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, date_text(record).as_str())?;
        worksheet.write_string(row, 1, &record.region)?;
        if let Some(product) = &record.product {
            worksheet.write_string(row, 2, product)?;
        }
        if let Some(sales) = record.sales {
            worksheet.write_number(row, 3, sales)?;
        }
        worksheet.write_string(row, 4, &record.category)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Render rows in the requested format
pub fn export(rows: &[&SalesRecord], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(rows)?.into_bytes()),
        #[cfg(feature = "web")]
        ExportFormat::Xlsx => to_xlsx(rows),
        #[cfg(not(feature = "web"))]
        ExportFormat::Xlsx => Err(ExportError::UnsupportedFormat(
            "xlsx export requires the 'web' feature".to_string(),
        )),
    }
}
