//! Typed record extraction from export tables

use std::str::FromStr;

use tracing::{debug, instrument};
use watchstat_common::{
    non_empty, parse_start_time, BillingRecord, ClockDuration, IpSession, Result, ViewingRecord,
    WatchstatError,
};

use crate::Table;

/// Columns every viewing activity table must carry
pub const VIEWING_COLUMNS: [&str; 8] = [
    "Profile_Name",
    "Start_Time",
    "Duration",
    "Title",
    "Supplemental_Video_Type",
    "Device_Type",
    "Bookmark",
    "Country",
];

/// Columns every billing history table must carry
pub const BILLING_COLUMNS: [&str; 4] = [
    "Pmt_Status",
    "Final_Invoice_Result",
    "Gross_Sale_Amt",
    "Currency",
];

/// Columns every IP address table must carry
pub const IP_COLUMNS: [&str; 2] = ["Ip_Address", "Country"];

/// All typed records of one export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRecords {
    /// Viewing activity
    pub viewing: Vec<ViewingRecord>,
    /// Billing history, empty when the export had none
    pub billing: Vec<BillingRecord>,
    /// IP session log, empty when the export had none
    pub ip_sessions: Vec<IpSession>,
}

/// Resolve every column up front so a missing one fails before any row is read
fn require_all<const N: usize>(table: &Table, columns: [&str; N]) -> Result<[usize; N]> {
    let mut indices = [0usize; N];
    for (slot, column) in indices.iter_mut().zip(columns) {
        *slot = table.require(column)?;
    }
    Ok(indices)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Attach table, row and column to a field error
fn field_error(table: &Table, row: usize, column: &str, err: WatchstatError) -> WatchstatError {
    WatchstatError::Data {
        message: format!("Invalid {} in {} row {}", column, table.source(), row + 1),
        column: Some(column.to_string()),
        source: Some(Box::new(err)),
    }
}

fn parse_field<T>(table: &Table, row: usize, column: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = WatchstatError>,
{
    value
        .parse()
        .map_err(|e| field_error(table, row, column, e))
}

/// Extract viewing records
#[instrument(skip(table), fields(source = %table.source(), rows = table.len()))]
pub fn viewing_records(table: &Table) -> Result<Vec<ViewingRecord>> {
    let [profile, start, duration, title, supplemental, device, bookmark, country] =
        require_all(table, VIEWING_COLUMNS)?;

    let records = table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<ViewingRecord> {
            let start_time = parse_start_time(cell(row, start))
                .map_err(|e| field_error(table, i, "Start_Time", e))?;
            let duration: ClockDuration = parse_field(table, i, "Duration", cell(row, duration))?;
            let bookmark: ClockDuration = parse_field(table, i, "Bookmark", cell(row, bookmark))?;

            Ok(ViewingRecord {
                profile_name: cell(row, profile).to_string(),
                title: cell(row, title).to_string(),
                start_time,
                duration,
                bookmark,
                device_type: cell(row, device).to_string(),
                country: cell(row, country).to_string(),
                supplemental_video_type: non_empty(cell(row, supplemental)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(records = records.len(), "Extracted viewing records");
    Ok(records)
}

/// Extract billing records; an empty amount counts as zero
#[instrument(skip(table), fields(source = %table.source(), rows = table.len()))]
pub fn billing_records(table: &Table) -> Result<Vec<BillingRecord>> {
    let [status, result, amount, currency] = require_all(table, BILLING_COLUMNS)?;

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<BillingRecord> {
            let raw_amount = cell(row, amount).trim();
            let gross_sale_amt = if raw_amount.is_empty() {
                0.0
            } else {
                raw_amount.parse::<f64>().map_err(|e| {
                    field_error(
                        table,
                        i,
                        "Gross_Sale_Amt",
                        WatchstatError::data_with_source(format!("'{}' is not a number", raw_amount), e),
                    )
                })?
            };

            Ok(BillingRecord {
                pmt_status: cell(row, status).trim().to_string(),
                final_invoice_result: cell(row, result).trim().to_string(),
                gross_sale_amt,
                currency: cell(row, currency).trim().to_string(),
            })
        })
        .collect()
}

/// Extract IP session records
#[instrument(skip(table), fields(source = %table.source(), rows = table.len()))]
pub fn ip_sessions(table: &Table) -> Result<Vec<IpSession>> {
    let [ip, country] = require_all(table, IP_COLUMNS)?;
    let region = table.column_index("Region_Code_Display_Name");
    let device = table.column_index("Device_Description");
    let timestamp = table.column_index("Ts");

    let optional = |row: &[String], idx: Option<usize>| idx.and_then(|i| non_empty(cell(row, i)));

    Ok(table
        .rows()
        .iter()
        .map(|row| IpSession {
            ip_address: cell(row, ip).trim().to_string(),
            country: cell(row, country).to_string(),
            region: optional(row, region),
            device_description: optional(row, device),
            timestamp: optional(row, timestamp),
        })
        .collect())
}
