use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use crate::error::PeriodParseError;
use crate::models::CampaignRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodPreset {
    MonthToDate,
    WeekToDate,
    Last7Days,
    Last30Days,
    LastMonth,
    QuarterToDate,
    LastQuarter,
    YearToDate,
}

impl PeriodPreset {
    pub const ALL: [PeriodPreset; 8] = [
        PeriodPreset::MonthToDate,
        PeriodPreset::WeekToDate,
        PeriodPreset::Last7Days,
        PeriodPreset::Last30Days,
        PeriodPreset::LastMonth,
        PeriodPreset::QuarterToDate,
        PeriodPreset::LastQuarter,
        PeriodPreset::YearToDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodPreset::MonthToDate => "month-to-date",
            PeriodPreset::WeekToDate => "week-to-date",
            PeriodPreset::Last7Days => "last-7-days",
            PeriodPreset::Last30Days => "last-30-days",
            PeriodPreset::LastMonth => "last-month",
            PeriodPreset::QuarterToDate => "quarter-to-date",
            PeriodPreset::LastQuarter => "last-quarter",
            PeriodPreset::YearToDate => "year-to-date",
        }
    }

    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|preset| preset.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Current window for this preset, anchored on `today`.
    pub fn window(self, today: NaiveDate) -> DateWindow {
        match self {
            PeriodPreset::MonthToDate => DateWindow::new(first_of_month(today), today),
            PeriodPreset::WeekToDate => {
                let since_monday = i64::from(today.weekday().num_days_from_monday());
                DateWindow::new(days_before(today, since_monday), today)
            }
            PeriodPreset::Last7Days => DateWindow::new(days_before(today, 7), today),
            PeriodPreset::Last30Days => DateWindow::new(days_before(today, 30), today),
            PeriodPreset::LastMonth => {
                let end = days_before(first_of_month(today), 1);
                DateWindow::new(first_of_month(end), end)
            }
            PeriodPreset::QuarterToDate => DateWindow::new(quarter_start(today), today),
            PeriodPreset::LastQuarter => {
                let end = days_before(quarter_start(today), 1);
                DateWindow::new(quarter_start(end), end)
            }
            PeriodPreset::YearToDate => {
                let jan_first = days_before(today, i64::from(today.ordinal0()));
                DateWindow::new(jan_first, today)
            }
        }
    }
}

impl fmt::Display for PeriodPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodPreset {
    type Err = PeriodParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == wanted)
            .ok_or_else(|| PeriodParseError(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSelection {
    Preset(PeriodPreset),
    Custom { start: NaiveDate, end: NaiveDate },
    /// First to last send date of the export.
    AllData,
}

/// Inclusive calendar-date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Bounds given in the wrong order are swapped.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Smallest window covering every send date in `records`.
    pub fn spanning(records: &[CampaignRecord]) -> Option<Self> {
        let first = records.iter().map(|r| r.send_date).min()?;
        let last = records.iter().map(|r| r.send_date).max()?;
        Some(Self::new(first, last))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The equally long window ending the day before this one starts. Both
    /// bounds stop at `NaiveDate::MIN`.
    pub fn previous(&self) -> Self {
        let span = self.end - self.start;
        let end = self.start.pred_opt().unwrap_or(NaiveDate::MIN);
        Self {
            start: end.checked_sub_signed(span).unwrap_or(NaiveDate::MIN),
            end,
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPeriod {
    pub selection: PeriodSelection,
    pub current: DateWindow,
    pub previous: DateWindow,
}

/// `data_range` backs [`PeriodSelection::AllData`]; without it that selection
/// falls back to `today` alone.
pub fn resolve(
    selection: &PeriodSelection,
    today: NaiveDate,
    data_range: Option<DateWindow>,
) -> ResolvedPeriod {
    let current = match *selection {
        PeriodSelection::Preset(preset) => preset.window(today),
        PeriodSelection::Custom { start, end } => DateWindow::new(start, end),
        PeriodSelection::AllData => data_range.unwrap_or(DateWindow::new(today, today)),
    };
    ResolvedPeriod {
        selection: *selection,
        current,
        previous: current.previous(),
    }
}

fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    days_before(date, i64::from(date.day0()))
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// First day of the calendar quarter containing `date`.
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_sub_months(Months::new(date.month0() % 3))
        .unwrap_or(NaiveDate::MIN)
}
