use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::compare;
use crate::error::SchemaError;
use crate::filter::{filter_records, FilterOptions, FilterSet};
use crate::metrics::derive_records;
use crate::models::{CampaignRecord, CampaignSummary, KpiComparison, RawTable, TrendPoint};
use crate::period::{resolve, DateWindow, PeriodSelection, ResolvedPeriod};

pub const TOP_PERFORMER_LIMIT: usize = 10;

/// Everything one dashboard render depends on besides the raw export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub today: NaiveDate,
    pub period: PeriodSelection,
    pub filters: FilterSet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Every cleaned record, regardless of period or filters.
    pub records: Vec<CampaignRecord>,
    pub options: FilterOptions,
    pub data_range: Option<DateWindow>,
    pub dropped_rows: usize,
    pub period: ResolvedPeriod,
    pub filters: FilterSet,
    pub current: Vec<CampaignRecord>,
    pub previous: Vec<CampaignRecord>,
    pub kpis: Vec<KpiComparison>,
    pub top_performers: Vec<CampaignRecord>,
    pub campaigns: Vec<CampaignSummary>,
    pub trend: Vec<TrendPoint>,
}

/// Runs the whole clean, resolve, filter and compare pipeline over a fresh export.
pub fn build_view(
    table: &RawTable,
    request: &ViewRequest,
) -> Result<DashboardView, SchemaError> {
    let load = derive_records(table)?;
    let data_range = DateWindow::spanning(&load.records);
    let period = resolve(&request.period, request.today, data_range);

    let current = filter_records(&load.records, &period.current, &request.filters);
    let previous = filter_records(&load.records, &period.previous, &request.filters);
    let kpis = compare::compare_kpis(&current, &previous);

    debug!(
        current_window = %period.current,
        previous_window = %period.previous,
        current_rows = current.len(),
        previous_rows = previous.len(),
        "built dashboard view"
    );

    Ok(DashboardView {
        options: FilterOptions::from_records(&load.records),
        data_range,
        dropped_rows: load.dropped_rows,
        period,
        filters: request.filters.clone(),
        top_performers: compare::top_performers(&current, TOP_PERFORMER_LIMIT),
        campaigns: compare::summarize_by_campaign(&current),
        trend: compare::open_rate_trend(&current),
        kpis,
        current,
        previous,
        records: load.records,
    })
}
