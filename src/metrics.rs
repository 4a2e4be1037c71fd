use chrono::{Month, NaiveDate};
use tracing::debug;

use crate::error::{SchemaError, EXPECTED_COLUMNS};
use crate::models::{CampaignRecord, RawTable};

// Positional layout of the campaign export.
const COL_YEAR: usize = 0;
const COL_MONTH: usize = 1;
const COL_DAY: usize = 2;
const COL_TIME: usize = 3;
const COL_RECIPIENT: usize = 4;
const COL_CAMPAIGN: usize = 5;
const COL_EMAIL_TYPE: usize = 6;
const COL_MESSAGE: usize = 7;
const COL_VARIANT: usize = 8;
const COL_RECEIVED: usize = 9;
const COL_TOTAL_OPENS: usize = 10;
const COL_UNIQUE_OPENS: usize = 11;
const COL_TOTAL_CLICKS: usize = 12;
const COL_UNIQUE_CLICKS: usize = 13;
const COL_UNSUBSCRIBED: usize = 14;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub records: Vec<CampaignRecord>,
    /// Rows dropped because their send date could not be built.
    pub dropped_rows: usize,
}

/// Validates the export layout and turns every parsable row into a typed record
/// with its open and click rates filled in.
pub fn derive_records(table: &RawTable) -> Result<LoadReport, SchemaError> {
    validate_schema(table)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped_rows = 0usize;

    for (index, row) in table.rows.iter().enumerate() {
        match derive_record(row) {
            Some(record) => records.push(record),
            None => {
                debug!(row = index, "dropping row with unparsable send date");
                dropped_rows += 1;
            }
        }
    }

    debug!(
        kept = records.len(),
        dropped = dropped_rows,
        "derived campaign records"
    );

    Ok(LoadReport {
        records,
        dropped_rows,
    })
}

pub fn validate_schema(table: &RawTable) -> Result<(), SchemaError> {
    if table.columns.is_empty() {
        return Err(SchemaError::MissingHeader);
    }
    if table.columns.len() < EXPECTED_COLUMNS {
        return Err(SchemaError::TooFewColumns {
            expected: EXPECTED_COLUMNS,
            found: table.columns.len(),
        });
    }
    Ok(())
}

fn derive_record(row: &[String]) -> Option<CampaignRecord> {
    let cell = |index: usize| row.get(index).map(|value| value.trim()).unwrap_or("");

    let send_date = parse_send_date(cell(COL_YEAR), cell(COL_MONTH), cell(COL_DAY))?;

    let total_received = clean_count(cell(COL_RECEIVED));
    let unique_opens = clean_count(cell(COL_UNIQUE_OPENS));
    let unique_clicks = clean_count(cell(COL_UNIQUE_CLICKS));

    Some(CampaignRecord {
        send_date,
        send_time: cell(COL_TIME).to_string(),
        recipient_id: cell(COL_RECIPIENT).to_string(),
        campaign_name: cell(COL_CAMPAIGN).to_string(),
        email_type: cell(COL_EMAIL_TYPE).to_string(),
        message: cell(COL_MESSAGE).to_string(),
        variant: cell(COL_VARIANT).to_string(),
        total_received,
        total_opens: clean_count(cell(COL_TOTAL_OPENS)),
        unique_opens,
        total_clicks: clean_count(cell(COL_TOTAL_CLICKS)),
        unique_clicks,
        unsubscribed: clean_count(cell(COL_UNSUBSCRIBED)),
        open_rate_pct: rate_pct(unique_opens, total_received),
        click_rate_pct: rate_pct(unique_clicks, total_received),
    })
}

/// Builds a calendar date from separate export fields. The month may be a
/// number or an English month name.
pub fn parse_send_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year: i32 = year.trim().parse().ok()?;
    let month = parse_month(month.trim())?;
    let day: u32 = day.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_month(value: &str) -> Option<u32> {
    if let Ok(number) = value.parse::<u32>() {
        return Some(number);
    }
    value
        .parse::<Month>()
        .ok()
        .map(|month| month.number_from_month())
}

/// Strips thousands separators and stray quotes; anything still unparsable is zero.
pub fn clean_count(raw: &str) -> u64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | '"'))
        .collect();
    cleaned.trim().parse().unwrap_or(0)
}

pub fn rate_pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
