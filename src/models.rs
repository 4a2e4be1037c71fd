use chrono::NaiveDate;
use serde::Serialize;

/// Positional export data as read from the sheet, before any structure is trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRecord {
    pub send_date: NaiveDate,
    pub send_time: String,
    pub recipient_id: String,
    pub campaign_name: String,
    pub email_type: String,
    pub message: String,
    pub variant: String,
    pub total_received: u64,
    pub total_opens: u64,
    pub unique_opens: u64,
    pub total_clicks: u64,
    pub unique_clicks: u64,
    pub unsubscribed: u64,
    pub open_rate_pct: f64,
    pub click_rate_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    EmailsSent,
    UniqueOpens,
    UniqueClicks,
    Unsubscribed,
    AvgOpenRate,
    AvgClickRate,
}

impl Kpi {
    pub const ALL: [Kpi; 6] = [
        Kpi::EmailsSent,
        Kpi::UniqueOpens,
        Kpi::UniqueClicks,
        Kpi::Unsubscribed,
        Kpi::AvgOpenRate,
        Kpi::AvgClickRate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Kpi::EmailsSent => "Emails sent",
            Kpi::UniqueOpens => "Unique opens",
            Kpi::UniqueClicks => "Unique clicks",
            Kpi::Unsubscribed => "Unsubscribed",
            Kpi::AvgOpenRate => "Avg. open rate",
            Kpi::AvgClickRate => "Avg. click rate",
        }
    }

    pub fn is_rate(self) -> bool {
        matches!(self, Kpi::AvgOpenRate | Kpi::AvgClickRate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiComparison {
    pub metric: Kpi,
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignSummary {
    pub campaign_name: String,
    pub sends: usize,
    pub total_received: u64,
    pub unique_opens: u64,
    pub unique_clicks: u64,
    pub avg_open_rate_pct: f64,
    pub avg_click_rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub open_rate_pct: f64,
    pub message: String,
}
