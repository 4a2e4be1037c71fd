use chrono::NaiveDate;

use email_campaign_kpis::source::read_export_from;
use email_campaign_kpis::{
    build_view, DateWindow, FilterSet, Kpi, PeriodPreset, PeriodSelection, SchemaError, ViewRequest,
};

const EXPORT: &str = "\
Campaign export,,,,,,,,,,,,,,
Year,Month,Day,Time,Number,Campaign,Type,Message,Variant,Received,Opens,Unique Opens,Clicks,Unique Clicks,Unsubscribed
2024,3,5,09:00,1001,Spring,promo,Spring sale,A,\"1,000\",400,250,90,50,2
2024,2,26,09:00,1001,Spring,promo,Teaser,A,800,200,120,30,16,1
2024,2,12,09:00,1002,Winter,newsletter,Clearance,B,600,100,60,10,6,0
2024,13,1,09:00,1002,Broken,newsletter,Bad date,B,600,100,60,10,6,0
2024,3,8,09:00,1003,Spring,promo,Empty send,B,0,0,0,0,0,0
";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn request(period: PeriodSelection, filters: FilterSet) -> ViewRequest {
    ViewRequest {
        today: d(2024, 3, 10),
        period,
        filters,
    }
}

#[test]
fn month_to_date_report_matches_worked_example() {
    let table = read_export_from(EXPORT.as_bytes(), 1).unwrap();
    let view = build_view(
        &table,
        &request(
            PeriodSelection::Preset(PeriodPreset::MonthToDate),
            FilterSet::default(),
        ),
    )
    .unwrap();

    assert_eq!(view.dropped_rows, 1);
    assert_eq!(view.period.current, DateWindow::new(d(2024, 3, 1), d(2024, 3, 10)));
    assert_eq!(view.period.previous, DateWindow::new(d(2024, 2, 20), d(2024, 2, 29)));

    let sale = view
        .current
        .iter()
        .find(|r| r.message == "Spring sale")
        .unwrap();
    assert_eq!(sale.open_rate_pct, 25.0);
    assert_eq!(sale.click_rate_pct, 5.0);

    let empty = view.current.iter().find(|r| r.message == "Empty send").unwrap();
    assert_eq!((empty.open_rate_pct, empty.click_rate_pct), (0.0, 0.0));

    assert_eq!(view.previous.len(), 1);
    let opens = view.kpis.iter().find(|k| k.metric == Kpi::UniqueOpens).unwrap();
    assert_eq!((opens.current, opens.previous, opens.delta), (250.0, 120.0, 130.0));

    let open_rate = view.kpis.iter().find(|k| k.metric == Kpi::AvgOpenRate).unwrap();
    assert!((open_rate.current - 12.5).abs() < 1e-9);
    assert!((open_rate.previous - 15.0).abs() < 1e-9);
    assert!((open_rate.delta + 2.5).abs() < 1e-9);
}

#[test]
fn last_quarter_in_january_reaches_back_a_year() {
    let table = read_export_from(EXPORT.as_bytes(), 1).unwrap();
    let view = build_view(
        &table,
        &ViewRequest {
            today: d(2024, 1, 15),
            period: PeriodSelection::Preset(PeriodPreset::LastQuarter),
            filters: FilterSet::default(),
        },
    )
    .unwrap();
    assert_eq!(view.period.current, DateWindow::new(d(2023, 10, 1), d(2023, 12, 31)));
    assert_eq!(view.period.previous.len_days(), 92);
    assert!(view.current.is_empty());
    assert!(view.kpis.iter().all(|k| k.current == 0.0 && k.previous == 0.0 && k.delta == 0.0));
}

#[test]
fn custom_period_with_filters() {
    let table = read_export_from(EXPORT.as_bytes(), 1).unwrap();
    let view = build_view(
        &table,
        &request(
            PeriodSelection::Custom {
                start: d(2024, 3, 31),
                end: d(2024, 2, 1),
            },
            FilterSet::default().with_variants(["B"]),
        ),
    )
    .unwrap();
    assert_eq!(view.period.current, DateWindow::new(d(2024, 2, 1), d(2024, 3, 31)));
    let messages: Vec<_> = view.current.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["Clearance", "Empty send"]);
    assert_eq!(view.options.variants, vec!["A", "B"]);
    assert_eq!(view.top_performers[0].message, "Clearance");
}

#[test]
fn narrow_export_is_a_schema_error() {
    let table = read_export_from("banner\nYear,Month,Day\n2024,3,5\n".as_bytes(), 1).unwrap();
    let err = build_view(
        &table,
        &request(
            PeriodSelection::Preset(PeriodPreset::MonthToDate),
            FilterSet::default(),
        ),
    )
    .unwrap_err();
    assert_eq!(
        err,
        SchemaError::TooFewColumns {
            expected: 15,
            found: 3
        }
    );
}

#[test]
fn oversized_counts_do_not_break_the_view() {
    let export = "\
banner
Year,Month,Day,Time,Number,Campaign,Type,Message,Variant,Received,Opens,Unique Opens,Clicks,Unique Clicks,Unsubscribed
2024,3,5,09:00,1,Spring,promo,A,A,18446744073709551615,0,10,0,1,0
2024,3,6,09:00,1,Spring,promo,B,A,18446744073709551615,0,10,0,1,0
";
    let table = read_export_from(export.as_bytes(), 1).unwrap();
    let view = build_view(
        &table,
        &request(
            PeriodSelection::Preset(PeriodPreset::MonthToDate),
            FilterSet::default(),
        ),
    )
    .unwrap();
    let sent = view.kpis.iter().find(|k| k.metric == Kpi::EmailsSent).unwrap();
    assert_eq!(sent.current, u64::MAX as f64);
    assert_eq!(view.campaigns[0].total_received, u64::MAX);
}

#[test]
fn all_data_period_spans_the_export() {
    let table = read_export_from(EXPORT.as_bytes(), 1).unwrap();
    let view = build_view(
        &table,
        &request(PeriodSelection::AllData, FilterSet::default()),
    )
    .unwrap();
    assert_eq!(view.period.current, DateWindow::new(d(2024, 2, 12), d(2024, 3, 8)));
    assert_eq!(view.current.len(), 4);
}
