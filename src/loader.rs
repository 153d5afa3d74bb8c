use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::path::Path;

use crate::error::UploadError;
use crate::record::{Dataset, REQUIRED_COLUMNS, SalesRecord};

/// Result of decoding an uploaded file
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Rows that survived date coercion and the Region/Category checks
    pub dataset: Dataset,

    /// Rows dropped for an unparseable Date or a missing Region/Category
    pub dropped_rows: usize,
}

/// A single cell as it came out of a decoder, before coercion
#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

/// Text cells read as missing, the same set pandas treats as NA by default
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(text: &str) -> bool {
    MISSING_TOKENS.contains(&text)
}

impl RawValue {
    fn as_label(&self) -> Option<String> {
        match self {
            RawValue::Empty => None,
            RawValue::Text(s) if is_missing(s) => None,
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Number(n) => Some(format_number(*n)),
            RawValue::DateTime(dt) => Some(dt.to_string()),
        }
    }

    fn as_number(&self) -> Option<f64> {
        let n = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            RawValue::DateTime(dt) => Some(*dt),
            RawValue::Text(s) => parse_date(s),
            _ => None,
        }
    }
}

static EMPTY_CELL: RawValue = RawValue::Empty;

// Whole numbers print without a trailing ".0" so numeric region codes stay readable.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parse a textual date the way the upload accepts it
///
/// Tries RFC 3339 first, then a fixed list of date-time and date-only layouts.
/// Date-only values land at midnight.
///
/// # Examples
/// ```
/// use sales_dashboard::loader::parse_date;
///
/// assert!(parse_date("2023-03-15").is_some());
/// assert!(parse_date("03/15/2023").is_some());
/// assert!(parse_date("not a date").is_none());
/// ```
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Load a dataset from uploaded CSV bytes
///
/// The first record is the header row. Short rows are padded with empty cells.
pub fn from_csv(bytes: &[u8]) -> Result<LoadReport, UploadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        RawValue::Empty
                    } else {
                        RawValue::Text(cell.to_string())
                    }
                })
                .collect(),
        );
    }

    build_dataset(&header, rows)
}

/// Load a dataset from uploaded workbook bytes
///
/// Reads the first worksheet only. Date-formatted cells convert natively;
/// text cells go through [`parse_date`].
#[cfg(feature = "web")]
pub fn from_excel(bytes: &[u8]) -> Result<LoadReport, UploadError> {
    use calamine::{Data, Reader, open_workbook_auto_from_rs};
    use std::io::Cursor;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| UploadError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| UploadError::Workbook("no sheets found in workbook".to_string()))?
        .map_err(|e| UploadError::Workbook(e.to_string()))?;

    let convert = |cell: &Data| -> RawValue {
        match cell {
            Data::Empty | Data::Error(_) => RawValue::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                RawValue::Text(s.clone())
            }
            Data::Int(i) => RawValue::Number(*i as f64),
            Data::Float(f) => RawValue::Number(*f),
            Data::Bool(b) => RawValue::Text(b.to_string()),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(RawValue::DateTime)
                .unwrap_or(RawValue::Empty),
        }
    };

    let mut sheet_rows = range.rows();
    let header: Vec<String> = match sheet_rows.next() {
        Some(row) => row
            .iter()
            .map(|cell| convert(cell).as_label().unwrap_or_default())
            .collect(),
        None => Vec::new(),
    };

    let rows = sheet_rows
        .map(|row| row.iter().map(convert).collect())
        .collect();

    build_dataset(&header, rows)
}

/// Detect the file type from the filename and decode accordingly
///
/// # Examples
/// ```
/// use sales_dashboard::loader::load_dataset;
///
/// let csv = b"Date,Region,Product,Sales,Category\n2023-01-05,North,Widget,10,Tools\n";
/// let report = load_dataset(csv, "sales.csv").unwrap();
/// assert_eq!(report.dataset.len(), 1);
/// ```
pub fn load_dataset(bytes: &[u8], filename: &str) -> Result<LoadReport, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => from_csv(bytes),
        #[cfg(feature = "web")]
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => {
            from_excel(bytes)
        }
        #[cfg(not(feature = "web"))]
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => Err(
            UploadError::UnsupportedExtension("workbooks require the 'web' feature".to_string()),
        ),
        Some(ext) => Err(UploadError::UnsupportedExtension(ext.to_string())),
        None => Err(UploadError::NoExtension),
    }
}

// Shared by both decoders: header validation, then per-row coercion.
fn build_dataset(header: &[String], rows: Vec<Vec<RawValue>>) -> Result<LoadReport, UploadError> {
    if header.iter().all(|h| h.is_empty()) {
        return Err(UploadError::MissingHeader);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !header.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(UploadError::MissingColumns(missing));
    }

    let index_of = |name: &str| header.iter().position(|h| h == name).unwrap_or(0);
    let [date_idx, region_idx, product_idx, sales_idx, category_idx] =
        REQUIRED_COLUMNS.map(index_of);

    let total = rows.len();
    let mut records = Vec::with_capacity(total);
    for row in rows {
        let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY_CELL);

        let (Some(date), Some(region), Some(category)) = (
            cell(date_idx).as_datetime(),
            cell(region_idx).as_label(),
            cell(category_idx).as_label(),
        ) else {
            continue;
        };

        records.push(SalesRecord {
            date,
            region,
            product: cell(product_idx).as_label(),
            sales: cell(sales_idx).as_number(),
            category,
        });
    }

    let dropped_rows = total - records.len();
    if dropped_rows > 0 {
        info!(
            "dropped {} of {} rows with a bad Date or missing Region/Category",
            dropped_rows, total
        );
    }
    debug!("decoded {} sales records", records.len());

    Ok(LoadReport {
        dataset: Dataset::new(records),
        dropped_rows,
    })
}
