//! Presentation layer: formats the summary cards and assembles the five
//! chart specs. Pure mapping, no state. Everything visual that is fixed
//! (colors, legend placement, margins) is fixed here.

use crate::aggregate::{DailyMissedRow, RateRow, StatusShareRow, Summary};
use crate::types::{ChartKind, ChartSpec, Legend, Margin, Series, Status, SummaryCard};

/// Accent color for attended appointments, warning color for missed ones.
/// Applied consistently across the two attendance-distribution charts.
const ATTENDED_COLOR: &str = "#286BB3";
const MISSED_COLOR: &str = "#E15759";

const STATUS_ORDER: [Status; 2] = [Status::Attended, Status::Missed];

fn status_color(status: Status) -> &'static str {
    match status {
        Status::Attended => ATTENDED_COLOR,
        Status::Missed => MISSED_COLOR,
    }
}

/// The three headline cards: no-show rate, total, recurring share.
/// Rates render with two decimals, the total as a plain integer.
pub fn summary_cards(summary: &Summary) -> Vec<SummaryCard> {
    vec![
        SummaryCard {
            title: "No-Show Rate".to_string(),
            value: format!("{:.2}%", summary.no_show_rate),
            icon: "📉".to_string(),
        },
        SummaryCard {
            title: "Total Appointments".to_string(),
            value: summary.total.to_string(),
            icon: "📅".to_string(),
        },
        SummaryCard {
            title: "Recurring Patients %".to_string(),
            value: format!("{:.2}%", summary.recurring_pct),
            icon: "🔄".to_string(),
        },
    ]
}

/// Grouped bars: attendance distribution per same-day flag.
pub fn same_day_chart(rows: &[StatusShareRow<bool>]) -> ChartSpec {
    let labelled: Vec<StatusShareRow<String>> = rows
        .iter()
        .map(|r| StatusShareRow {
            group: if r.group { "Yes" } else { "No" }.to_string(),
            status: r.status,
            percentage: r.percentage,
        })
        .collect();

    attendance_bar_chart(
        &labelled,
        "Same Day Appointment vs Attendance",
        "Same-Day Appointment",
        Margin { t: 30, b: 20, l: 10, r: 10 },
        Legend {
            orientation: "h".to_string(),
            x: 0.5,
            y: -0.4,
            x_anchor: "center".to_string(),
            font_size: 10,
        },
    )
}

/// Grouped bars: attendance distribution per days-waited bucket.
pub fn days_waited_chart(rows: &[StatusShareRow<String>]) -> ChartSpec {
    attendance_bar_chart(
        rows,
        "Days Waited vs Attendance",
        "Days Waited",
        Margin { t: 60, b: 40, l: 10, r: 10 },
        Legend {
            orientation: "h".to_string(),
            x: 0.5,
            y: 1.1,
            x_anchor: "center".to_string(),
            font_size: 10,
        },
    )
}

/// Single-series bars: missed-rate fraction per age group.
pub fn age_group_chart(rows: &[RateRow]) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: "Missed Rate by Age Group".to_string(),
        x_title: Some("Age Group".to_string()),
        y_title: Some("Missed Rate".to_string()),
        series: vec![Series {
            name: "Missed Rate".to_string(),
            color: None,
            x: rows.iter().map(|r| r.label.clone()).collect(),
            y: rows.iter().map(|r| r.rate).collect(),
        }],
        margin: Margin { t: 30, b: 20, l: 10, r: 10 },
        legend: Some(Legend {
            orientation: "h".to_string(),
            x: 0.5,
            y: 1.02,
            x_anchor: "center".to_string(),
            font_size: 10,
        }),
        bar_mode: None,
        hole: None,
        range_buttons: Vec::new(),
    }
}

/// Time series: missed appointments per scheduled date, with the range
/// selector the UI shows above the axis.
pub fn over_time_chart(rows: &[DailyMissedRow]) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Line,
        title: "Missed Appointments Over Time".to_string(),
        x_title: None,
        y_title: Some("Number of Missed Appointments".to_string()),
        series: vec![Series {
            name: "Missed Appointments".to_string(),
            color: None,
            x: rows
                .iter()
                .map(|r| r.date.format("%Y-%m-%d").to_string())
                .collect(),
            y: rows.iter().map(|r| r.missed as f64).collect(),
        }],
        margin: Margin { t: 60, b: 20, l: 30, r: 10 },
        legend: Some(Legend {
            orientation: "h".to_string(),
            x: 0.5,
            y: 1.1,
            x_anchor: "center".to_string(),
            font_size: 10,
        }),
        bar_mode: None,
        hole: None,
        range_buttons: vec![
            "1w".to_string(),
            "1m".to_string(),
            "6m".to_string(),
            "all".to_string(),
        ],
    }
}

/// Donut pie of the worst-attended neighbourhoods.
pub fn neighbourhood_chart(rows: &[RateRow]) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Pie,
        title: "Top 5 Neighbourhoods by Missed Appointments".to_string(),
        x_title: None,
        y_title: None,
        series: vec![Series {
            name: "Missed Rate".to_string(),
            color: None,
            x: rows.iter().map(|r| r.label.clone()).collect(),
            y: rows.iter().map(|r| r.rate).collect(),
        }],
        margin: Margin { t: 40, b: 20, l: 20, r: 20 },
        legend: Some(Legend {
            orientation: "h".to_string(),
            x: 0.5,
            y: -0.4,
            x_anchor: "center".to_string(),
            font_size: 9,
        }),
        bar_mode: None,
        hole: Some(0.4),
        range_buttons: Vec::new(),
    }
}

/// Shared shape of the two attendance-distribution charts: one colored
/// series per status present, grouped bars, percentages on the y axis.
fn attendance_bar_chart(
    rows: &[StatusShareRow<String>],
    title: &str,
    x_title: &str,
    margin: Margin,
    legend: Legend,
) -> ChartSpec {
    let mut series = Vec::new();
    for status in STATUS_ORDER {
        let of_status: Vec<&StatusShareRow<String>> =
            rows.iter().filter(|r| r.status == status).collect();
        if of_status.is_empty() {
            continue;
        }
        series.push(Series {
            name: status.label().to_string(),
            color: Some(status_color(status).to_string()),
            x: of_status.iter().map(|r| r.group.clone()).collect(),
            y: of_status.iter().map(|r| r.percentage).collect(),
        });
    }

    ChartSpec {
        kind: ChartKind::Bar,
        title: title.to_string(),
        x_title: Some(x_title.to_string()),
        y_title: Some("Percentage".to_string()),
        series,
        margin,
        legend: Some(legend),
        bar_mode: Some("group".to_string()),
        hole: None,
        range_buttons: Vec::new(),
    }
}
