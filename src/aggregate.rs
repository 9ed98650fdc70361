//! Aggregation engine: the summary statistics and the five chart datasets,
//! each a pure function of the filtered subset. Group keys iterate ascending
//! (BTreeMap order). An empty subset yields zeros and empty tables, never a
//! division by zero.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{AppointmentRecord, Status};
use crate::util::capitalize;

/// How many neighbourhoods the worst-offenders chart shows.
const TOP_NEIGHBOURHOOD_COUNT: usize = 5;

/// Headline statistics for the three cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Percentage of missed appointments, 0–100.
    pub no_show_rate: f64,
    pub total: usize,
    /// Percentage of recurring patients, 0–100.
    pub recurring_pct: f64,
}

/// One row of a within-group attendance distribution (same-day and
/// days-waited charts). Percentages sum to 100 inside each group.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusShareRow<K> {
    pub group: K,
    pub status: Status,
    pub percentage: f64,
}

/// A labelled missed-rate fraction in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub label: String,
    pub rate: f64,
}

/// Missed-appointment count for one scheduled date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMissedRow {
    pub date: NaiveDate,
    pub missed: u64,
}

pub fn summarize(subset: &[&AppointmentRecord]) -> Summary {
    if subset.is_empty() {
        return Summary {
            no_show_rate: 0.0,
            total: 0,
            recurring_pct: 0.0,
        };
    }

    let total = subset.len();
    let missed = subset.iter().filter(|r| r.missed).count();
    let recurring = subset.iter().filter(|r| r.is_recurring).count();

    Summary {
        no_show_rate: missed as f64 / total as f64 * 100.0,
        total,
        recurring_pct: recurring as f64 / total as f64 * 100.0,
    }
}

/// Attendance distribution per same-day flag.
pub fn same_day_attendance(subset: &[&AppointmentRecord]) -> Vec<StatusShareRow<bool>> {
    status_share_by(subset, |r| r.same_day)
}

/// Attendance distribution per days-waited bucket.
pub fn days_waited_attendance(subset: &[&AppointmentRecord]) -> Vec<StatusShareRow<String>> {
    status_share_by(subset, |r| r.days_waited_range.clone())
}

/// Mean missed rate per age group, ascending by group label.
pub fn missed_rate_by_age_group(subset: &[&AppointmentRecord]) -> Vec<RateRow> {
    rate_rows(group_rates(subset, |r| r.age_group.clone()))
}

/// Missed-appointment count per distinct scheduled date, ascending. A date
/// with only attended rows still appears, with a count of zero.
pub fn missed_over_time(subset: &[&AppointmentRecord]) -> Vec<DailyMissedRow> {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in subset {
        let count = by_date.entry(record.scheduled_date).or_insert(0);
        if record.missed {
            *count += 1;
        }
    }
    by_date
        .into_iter()
        .map(|(date, missed)| DailyMissedRow { date, missed })
        .collect()
}

/// The five neighbourhoods with the worst missed rate, descending. Ties keep
/// their ascending-label order (stable sort); labels are capitalized for
/// display. Fewer than five distinct neighbourhoods means fewer rows.
pub fn top_neighbourhoods(subset: &[&AppointmentRecord]) -> Vec<RateRow> {
    let mut rows = rate_rows(group_rates(subset, |r| r.neighbourhood.clone()));
    rows.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    rows.truncate(TOP_NEIGHBOURHOOD_COUNT);
    for row in &mut rows {
        row.label = capitalize(&row.label);
    }
    rows
}

/// Per-group attendance percentages. Statuses absent from a group are
/// omitted rather than emitted with a zero share.
fn status_share_by<K, F>(subset: &[&AppointmentRecord], key: F) -> Vec<StatusShareRow<K>>
where
    K: Ord + Clone,
    F: Fn(&AppointmentRecord) -> K,
{
    let mut counts: BTreeMap<K, (u64, u64)> = BTreeMap::new();
    for record in subset {
        let entry = counts.entry(key(record)).or_insert((0, 0));
        match record.status {
            Status::Attended => entry.0 += 1,
            Status::Missed => entry.1 += 1,
        }
    }

    let mut rows = Vec::new();
    for (group, (attended, missed)) in counts {
        let group_total = (attended + missed) as f64;
        for (status, count) in [(Status::Attended, attended), (Status::Missed, missed)] {
            if count > 0 {
                rows.push(StatusShareRow {
                    group: group.clone(),
                    status,
                    percentage: count as f64 / group_total * 100.0,
                });
            }
        }
    }
    rows
}

/// Mean missed rate per group key, as (missed, total) tallies.
fn group_rates<F>(subset: &[&AppointmentRecord], key: F) -> BTreeMap<String, (u64, u64)>
where
    F: Fn(&AppointmentRecord) -> String,
{
    let mut tallies: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for record in subset {
        let entry = tallies.entry(key(record)).or_insert((0, 0));
        if record.missed {
            entry.0 += 1;
        }
        entry.1 += 1;
    }
    tallies
}

fn rate_rows(tallies: BTreeMap<String, (u64, u64)>) -> Vec<RateRow> {
    tallies
        .into_iter()
        .map(|(label, (missed, total))| RateRow {
            label,
            rate: missed as f64 / total as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordSpec {
        age_group: &'static str,
        same_day: bool,
        missed: bool,
        date: &'static str,
        neighbourhood: &'static str,
    }

    impl Default for RecordSpec {
        fn default() -> Self {
            Self {
                age_group: "18-30",
                same_day: false,
                missed: false,
                date: "2016-05-02",
                neighbourhood: "CENTRO",
            }
        }
    }

    fn record(spec: RecordSpec) -> AppointmentRecord {
        AppointmentRecord {
            gender: "Female".to_string(),
            age_group: spec.age_group.to_string(),
            is_recurring: false,
            same_day: spec.same_day,
            conditions: 0,
            status: if spec.missed {
                Status::Missed
            } else {
                Status::Attended
            },
            missed: spec.missed,
            scheduled_date: spec.date.parse().unwrap(),
            days_waited_range: "0-7 days".to_string(),
            neighbourhood: spec.neighbourhood.to_string(),
        }
    }

    fn refs(records: &[AppointmentRecord]) -> Vec<&AppointmentRecord> {
        records.iter().collect()
    }

    #[test]
    fn empty_subset_summarizes_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.no_show_rate, 0.0);
        assert_eq!(summary.recurring_pct, 0.0);
    }

    #[test]
    fn empty_subset_yields_empty_chart_tables() {
        assert!(same_day_attendance(&[]).is_empty());
        assert!(missed_rate_by_age_group(&[]).is_empty());
        assert!(days_waited_attendance(&[]).is_empty());
        assert!(missed_over_time(&[]).is_empty());
        assert!(top_neighbourhoods(&[]).is_empty());
    }

    #[test]
    fn single_missed_row_is_a_full_no_show() {
        let records = vec![record(RecordSpec {
            missed: true,
            ..Default::default()
        })];
        let summary = summarize(&refs(&records));
        assert_eq!(summary.total, 1);
        assert_eq!(summary.no_show_rate, 100.0);
    }

    #[test]
    fn recurring_share_counts_recurring_rows() {
        let mut records = vec![record(RecordSpec::default()); 3];
        records[0].is_recurring = true;
        let summary = summarize(&refs(&records));
        assert!((summary.recurring_pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn status_shares_sum_to_100_within_each_group() {
        let records = vec![
            record(RecordSpec { same_day: true, missed: true, ..Default::default() }),
            record(RecordSpec { same_day: true, ..Default::default() }),
            record(RecordSpec { same_day: true, ..Default::default() }),
            record(RecordSpec { missed: true, ..Default::default() }),
            record(RecordSpec::default()),
        ];
        let rows = same_day_attendance(&refs(&records));

        for group in [false, true] {
            let sum: f64 = rows
                .iter()
                .filter(|r| r.group == group)
                .map(|r| r.percentage)
                .sum();
            assert!((sum - 100.0).abs() < 1e-9, "group {group} sums to {sum}");
        }
    }

    #[test]
    fn status_share_groups_iterate_ascending() {
        let records = vec![
            record(RecordSpec { same_day: true, ..Default::default() }),
            record(RecordSpec::default()),
        ];
        let rows = same_day_attendance(&refs(&records));
        assert_eq!(rows[0].group, false);
        assert_eq!(rows[rows.len() - 1].group, true);
    }

    #[test]
    fn status_share_omits_absent_statuses() {
        let records = vec![record(RecordSpec::default())];
        let rows = same_day_attendance(&refs(&records));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, Status::Attended);
        assert_eq!(rows[0].percentage, 100.0);
    }

    #[test]
    fn age_group_rates_are_fractions() {
        let records = vec![
            record(RecordSpec { age_group: "31-45", missed: true, ..Default::default() }),
            record(RecordSpec { age_group: "31-45", ..Default::default() }),
            record(RecordSpec::default()),
        ];
        let rows = missed_rate_by_age_group(&refs(&records));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "18-30");
        assert_eq!(rows[0].rate, 0.0);
        assert_eq!(rows[1].label, "31-45");
        assert_eq!(rows[1].rate, 0.5);
    }

    #[test]
    fn shared_date_collapses_to_one_row_counting_missed_only() {
        let records = vec![
            record(RecordSpec { missed: true, ..Default::default() }),
            record(RecordSpec::default()),
        ];
        let rows = missed_over_time(&refs(&records));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].missed, 1);
    }

    #[test]
    fn missed_over_time_orders_dates_ascending() {
        let records = vec![
            record(RecordSpec { date: "2016-05-10", missed: true, ..Default::default() }),
            record(RecordSpec { date: "2016-04-29", ..Default::default() }),
            record(RecordSpec { date: "2016-05-02", missed: true, ..Default::default() }),
        ];
        let rows = missed_over_time(&refs(&records));
        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        // The attended-only date still gets a row.
        assert_eq!(rows[0].missed, 0);
    }

    #[test]
    fn top_neighbourhoods_caps_at_five_descending() {
        let mut records = Vec::new();
        for (i, name) in ["A", "B", "C", "D", "E", "F"].into_iter().enumerate() {
            // Neighbourhood i gets i missed rows and one attended row.
            for _ in 0..i {
                records.push(record(RecordSpec {
                    neighbourhood: name,
                    missed: true,
                    ..Default::default()
                }));
            }
            records.push(record(RecordSpec {
                neighbourhood: name,
                ..Default::default()
            }));
        }
        let rows = top_neighbourhoods(&refs(&records));

        assert_eq!(rows.len(), 5);
        assert!(rows.windows(2).all(|w| w[0].rate >= w[1].rate));
        // "A" has rate 0 and drops off the board.
        assert!(rows.iter().all(|r| r.label != "A"));
    }

    #[test]
    fn top_neighbourhood_ties_keep_ascending_label_order() {
        let records = vec![
            record(RecordSpec { neighbourhood: "BENTO", missed: true, ..Default::default() }),
            record(RecordSpec { neighbourhood: "ANDORINHAS", missed: true, ..Default::default() }),
        ];
        let rows = top_neighbourhoods(&refs(&records));
        assert_eq!(rows[0].label, "Andorinhas");
        assert_eq!(rows[1].label, "Bento");
    }

    #[test]
    fn top_neighbourhoods_returns_all_when_under_five() {
        let records = vec![
            record(RecordSpec { neighbourhood: "CENTRO", missed: true, ..Default::default() }),
            record(RecordSpec { neighbourhood: "MARIA ORTIZ", ..Default::default() }),
        ];
        let rows = top_neighbourhoods(&refs(&records));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Centro");
        assert_eq!(rows[1].label, "Maria ortiz");
    }
}
