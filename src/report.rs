use std::fmt::Write;

use crate::models::{Kpi, KpiComparison};
use crate::pipeline::DashboardView;
use crate::period::PeriodSelection;

const TREND_LINES: usize = 15;

pub fn build_report(view: &DashboardView) -> String {
    let mut output = String::new();
    let period = &view.period;

    let period_label = match period.selection {
        PeriodSelection::Preset(preset) => preset.to_string(),
        PeriodSelection::Custom { .. } => "custom".to_string(),
        PeriodSelection::AllData => "all data".to_string(),
    };

    let _ = writeln!(output, "# Email Campaign KPI Report");
    let _ = writeln!(
        output,
        "Period {} ({}, {} days) compared with {}",
        period_label,
        period.current,
        period.current.len_days(),
        period.previous
    );
    if !view.filters.is_unrestricted() {
        let _ = writeln!(output, "Filters: {}", describe_filters(view));
    }
    if view.dropped_rows > 0 {
        let _ = writeln!(
            output,
            "{} export rows skipped because their send date could not be read.",
            view.dropped_rows
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## KPIs");
    let _ = writeln!(output, "| Metric | Current | Previous | Change |");
    let _ = writeln!(output, "|---|---:|---:|---:|");
    for kpi in view.kpis.iter() {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            kpi.metric.label(),
            format_value(kpi.metric, kpi.current),
            format_value(kpi.metric, kpi.previous),
            format_delta(kpi)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Campaign Mix");

    if view.campaigns.is_empty() {
        let _ = writeln!(output, "No sends recorded for this period.");
    } else {
        for summary in view.campaigns.iter() {
            let _ = writeln!(
                output,
                "- {}: {} sends, {} received (avg open rate {:.1}%, avg click rate {:.2}%)",
                summary.campaign_name,
                summary.sends,
                thousands(summary.total_received as f64),
                summary.avg_open_rate_pct,
                summary.avg_click_rate_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Performers (Clicks)");

    if view.top_performers.is_empty() {
        let _ = writeln!(output, "No sends recorded for this period.");
    } else {
        for record in view.top_performers.iter() {
            let _ = writeln!(
                output,
                "- {} {} \"{}\": {} opens, {} clicks ({:.1}% open, {:.2}% click)",
                record.send_date,
                record.campaign_name,
                record.message,
                thousands(record.unique_opens as f64),
                thousands(record.unique_clicks as f64),
                record.open_rate_pct,
                record.click_rate_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Open Rate Trend");

    if view.trend.is_empty() {
        let _ = writeln!(output, "No sends recorded for this period.");
    } else {
        let skip = view.trend.len().saturating_sub(TREND_LINES);
        for point in view.trend.iter().skip(skip) {
            let _ = writeln!(
                output,
                "- {}: {:.1}% ({})",
                point.date, point.open_rate_pct, point.message
            );
        }
    }

    output
}

fn describe_filters(view: &DashboardView) -> String {
    let filters = &view.filters;
    [
        ("campaign", &filters.campaign_names),
        ("recipient", &filters.recipient_ids),
        ("email type", &filters.email_types),
        ("message", &filters.messages),
        ("variant", &filters.variants),
    ]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(name, values)| {
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        format!("{name} in [{}]", values.join(", "))
    })
    .collect::<Vec<_>>()
    .join("; ")
}

pub fn format_value(metric: Kpi, value: f64) -> String {
    match metric {
        Kpi::AvgOpenRate => format!("{value:.1}%"),
        Kpi::AvgClickRate => format!("{value:.2}%"),
        _ => thousands(value),
    }
}

fn format_delta(kpi: &KpiComparison) -> String {
    let sign = if kpi.delta > 0.0 { "+" } else { "" };
    match kpi.metric {
        Kpi::AvgOpenRate => format!("{sign}{:.1} pp", kpi.delta),
        Kpi::AvgClickRate => format!("{sign}{:.2} pp", kpi.delta),
        _ => format!("{sign}{}", thousands(kpi.delta)),
    }
}

/// Rounds to a whole number and groups digits with commas.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
