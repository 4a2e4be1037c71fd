use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{CampaignRecord, CampaignSummary, Kpi, KpiComparison, TrendPoint};

/// Compares every tracked KPI between two equally filtered record sets.
pub fn compare_kpis(
    current: &[CampaignRecord],
    previous: &[CampaignRecord],
) -> Vec<KpiComparison> {
    Kpi::ALL
        .into_iter()
        .map(|metric| {
            let current = kpi_value(metric, current);
            let previous = kpi_value(metric, previous);
            KpiComparison {
                metric,
                current,
                previous,
                delta: delta(current, previous),
            }
        })
        .collect()
}

pub fn kpi_value(metric: Kpi, records: &[CampaignRecord]) -> f64 {
    match metric {
        Kpi::EmailsSent => sum(records, |r| r.total_received),
        Kpi::UniqueOpens => sum(records, |r| r.unique_opens),
        Kpi::UniqueClicks => sum(records, |r| r.unique_clicks),
        Kpi::Unsubscribed => sum(records, |r| r.unsubscribed),
        Kpi::AvgOpenRate => mean_or_zero(records.iter().map(|r| r.open_rate_pct)),
        Kpi::AvgClickRate => mean_or_zero(records.iter().map(|r| r.click_rate_pct)),
    }
}

/// Change against the previous period; zero whenever there was nothing to compare with.
pub fn delta(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        current - previous
    } else {
        0.0
    }
}

pub fn mean_or_zero(values: impl Iterator<Item = f64>) -> f64 {
    let (total, count) = values.fold((0.0, 0usize), |(total, count), value| {
        (total + value, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn sum(records: &[CampaignRecord], field: impl Fn(&CampaignRecord) -> u64) -> f64 {
    saturating_total(records.iter().map(field)) as f64
}

/// Count total that stops at `u64::MAX` instead of wrapping.
pub fn saturating_total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

/// Highest unique-click sends first; ties keep the earliest send on top.
pub fn top_performers(records: &[CampaignRecord], limit: usize) -> Vec<CampaignRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| {
        b.unique_clicks
            .cmp(&a.unique_clicks)
            .then_with(|| a.send_date.cmp(&b.send_date))
            .then_with(|| a.campaign_name.cmp(&b.campaign_name))
    });
    ranked.truncate(limit);
    ranked
}

pub fn summarize_by_campaign(records: &[CampaignRecord]) -> Vec<CampaignSummary> {
    let mut map: HashMap<&str, Vec<&CampaignRecord>> = HashMap::new();

    for record in records {
        map.entry(record.campaign_name.as_str())
            .or_default()
            .push(record);
    }

    let mut summaries: Vec<CampaignSummary> = map
        .into_iter()
        .map(|(campaign_name, sends)| CampaignSummary {
            campaign_name: campaign_name.to_string(),
            sends: sends.len(),
            total_received: saturating_total(sends.iter().map(|r| r.total_received)),
            unique_opens: saturating_total(sends.iter().map(|r| r.unique_opens)),
            unique_clicks: saturating_total(sends.iter().map(|r| r.unique_clicks)),
            avg_open_rate_pct: mean_or_zero(sends.iter().map(|r| r.open_rate_pct)),
            avg_click_rate_pct: mean_or_zero(sends.iter().map(|r| r.click_rate_pct)),
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_received
            .cmp(&a.total_received)
            .then_with(|| a.campaign_name.cmp(&b.campaign_name))
    });
    summaries
}

pub fn open_rate_trend(records: &[CampaignRecord]) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = records
        .iter()
        .map(|r| TrendPoint {
            date: r.send_date,
            open_rate_pct: r.open_rate_pct,
            message: r.message.clone(),
        })
        .collect();
    points.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.message.cmp(&b.message))
            .then_with(|| {
                a.open_rate_pct
                    .partial_cmp(&b.open_rate_pct)
                    .unwrap_or(Ordering::Equal)
            })
    });
    points
}
