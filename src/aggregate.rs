//! Pure rollup functions over a ledger snapshot.
//!
//! Nothing here mutates its input or touches storage. Summaries are recomputed on every query;
//! ledgers are small enough that caching would only add invalidation problems. All sums are
//! exact `Decimal` arithmetic, so two aggregations over the same data are bit-for-bit identical.

use crate::model::{DailySummary, Ledger, MonthlySummary, WeekKey, WeeklySummary};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Groups by calendar date, one row per distinct date, ascending.
pub fn daily(ledger: &Ledger) -> Vec<DailySummary> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in ledger.iter() {
        *buckets.entry(record.date).or_default() += record.amount.value();
    }
    buckets
        .into_iter()
        .map(|(date, total)| DailySummary {
            date,
            total,
            goal_met: None,
        })
        .collect()
}

/// Groups by ISO week. The bucket key carries the ISO week-year, so weeks that straddle a
/// calendar year boundary never merge with their neighbors from the other year.
pub fn weekly(ledger: &Ledger) -> Vec<WeeklySummary> {
    let mut buckets: BTreeMap<WeekKey, Decimal> = BTreeMap::new();
    for record in ledger.iter() {
        *buckets.entry(WeekKey::from_date(record.date)).or_default() += record.amount.value();
    }
    buckets
        .into_iter()
        .map(|(week, total)| WeeklySummary { week, total })
        .collect()
}

/// Groups by calendar year-month, keyed "YYYY-MM", ascending.
pub fn monthly(ledger: &Ledger) -> Vec<MonthlySummary> {
    let mut buckets: BTreeMap<String, Decimal> = BTreeMap::new();
    for record in ledger.iter() {
        *buckets.entry(record.month_key()).or_default() += record.amount.value();
    }
    buckets
        .into_iter()
        .map(|(month, total)| MonthlySummary { month, total })
        .collect()
}

/// Keeps the daily rows belonging to `month_key` (exact "YYYY-MM" match).
pub fn filter_by_month(summaries: &[DailySummary], month_key: &str) -> Vec<DailySummary> {
    summaries
        .iter()
        .filter(|s| s.month_key() == month_key)
        .cloned()
        .collect()
}

/// The distinct months present in `summaries`, newest first. This is the set a UI offers in its
/// month picker.
pub fn months(summaries: &[DailySummary]) -> Vec<String> {
    let mut keys: Vec<String> = summaries.iter().map(|s| s.month_key()).collect();
    keys.sort();
    keys.dedup();
    keys.reverse();
    keys
}

/// Annotates daily rows with whether each day met `goal`. With no active goal (`goal <= 0`) the
/// rows are returned unannotated.
pub fn mark_goal(mut summaries: Vec<DailySummary>, goal: Decimal) -> Vec<DailySummary> {
    if goal <= Decimal::ZERO {
        return summaries;
    }
    for summary in &mut summaries {
        summary.goal_met = Some(summary.total >= goal);
    }
    summaries
}

/// The percentage of days in `summaries` whose total met `goal`.
///
/// Only meaningful when `goal > 0`; with no goal, or with an empty summary set, this is 0.0
/// rather than an error or NaN.
pub fn success_rate(summaries: &[DailySummary], goal: Decimal) -> f64 {
    if goal <= Decimal::ZERO || summaries.is_empty() {
        return 0.0;
    }
    let met = summaries.iter().filter(|s| s.total >= goal).count();
    met as f64 / summaries.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, Amount, IncomeRecord};
    use std::str::FromStr;

    fn ledger(rows: &[(&str, &str)]) -> Ledger {
        Ledger::new(
            rows.iter()
                .map(|(date, amount)| {
                    IncomeRecord::new(
                        parse_date(date).unwrap(),
                        Amount::from_str(amount).unwrap(),
                        None,
                        None,
                    )
                })
                .collect(),
        )
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_daily_merges_same_date() {
        let summaries = daily(&ledger(&[("2024-01-05", "100.00"), ("2024-01-05", "50.00")]));
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].date, parse_date("2024-01-05").unwrap());
        assert_eq!(summaries[0].total, dec("150.00"));
        assert_eq!(summaries[0].goal_met, None);
    }

    #[test]
    fn test_daily_sorted_ascending() {
        let summaries = daily(&ledger(&[
            ("2024-02-01", "1.00"),
            ("2024-01-05", "1.00"),
            ("2024-01-20", "1.00"),
        ]));
        let dates: Vec<_> = summaries.iter().map(|s| s.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_weekly_does_not_merge_across_years() {
        // 2021-01-01 belongs to ISO week 53 of 2020; 2021-01-04 to week 1 of 2021.
        let summaries = weekly(&ledger(&[("2021-01-01", "10.00"), ("2021-01-04", "20.00")]));
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].week.to_string(), "2020-W53");
        assert_eq!(summaries[1].week.to_string(), "2021-W01");
    }

    #[test]
    fn test_monthly_keys() {
        let summaries = monthly(&ledger(&[
            ("2024-01-05", "10.00"),
            ("2024-01-20", "5.00"),
            ("2024-02-01", "1.00"),
        ]));
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].month, "2024-01");
        assert_eq!(summaries[0].total, dec("15.00"));
        assert_eq!(summaries[1].month, "2024-02");
    }

    #[test]
    fn test_aggregation_conserves_total() {
        let ledger = ledger(&[
            ("2021-01-01", "0.10"),
            ("2021-01-04", "0.20"),
            ("2021-02-28", "0.30"),
            ("2021-02-28", "99.99"),
        ]);
        let total = ledger.total();
        let daily_sum: Decimal = daily(&ledger).iter().map(|s| s.total).sum();
        let weekly_sum: Decimal = weekly(&ledger).iter().map(|s| s.total).sum();
        let monthly_sum: Decimal = monthly(&ledger).iter().map(|s| s.total).sum();
        assert_eq!(daily_sum, total);
        assert_eq!(weekly_sum, total);
        assert_eq!(monthly_sum, total);
    }

    #[test]
    fn test_aggregation_reproducible() {
        let ledger = ledger(&[("2024-01-05", "33.33"), ("2024-01-06", "66.67")]);
        assert_eq!(daily(&ledger), daily(&ledger));
        assert_eq!(weekly(&ledger), weekly(&ledger));
        assert_eq!(monthly(&ledger), monthly(&ledger));
    }

    #[test]
    fn test_filter_by_month() {
        let summaries = daily(&ledger(&[
            ("2024-01-05", "10.00"),
            ("2024-02-05", "20.00"),
        ]));
        let filtered = filter_by_month(&summaries, "2024-01");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].total, dec("10.00"));
        assert!(filter_by_month(&summaries, "2023-01").is_empty());
    }

    #[test]
    fn test_months_newest_first() {
        let summaries = daily(&ledger(&[
            ("2024-01-05", "1.00"),
            ("2024-03-05", "1.00"),
            ("2024-02-05", "1.00"),
            ("2024-03-09", "1.00"),
        ]));
        assert_eq!(months(&summaries), vec!["2024-03", "2024-02", "2024-01"]);
    }

    #[test]
    fn test_mark_goal() {
        let summaries = daily(&ledger(&[
            ("2024-01-05", "100.00"),
            ("2024-01-06", "40.00"),
        ]));
        let marked = mark_goal(summaries.clone(), dec("50.00"));
        assert_eq!(marked[0].goal_met, Some(true));
        assert_eq!(marked[1].goal_met, Some(false));

        // No active goal means no annotation.
        let unmarked = mark_goal(summaries, Decimal::ZERO);
        assert!(unmarked.iter().all(|s| s.goal_met.is_none()));
    }

    #[test]
    fn test_success_rate() {
        let summaries = daily(&ledger(&[
            ("2024-01-05", "100.00"),
            ("2024-01-06", "40.00"),
            ("2024-01-07", "50.00"),
            ("2024-01-08", "10.00"),
        ]));
        let rate = success_rate(&summaries, dec("50.00"));
        assert!((rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_empty_is_zero() {
        assert_eq!(success_rate(&[], dec("50.00")), 0.0);
    }

    #[test]
    fn test_success_rate_no_goal_is_zero() {
        let summaries = daily(&ledger(&[("2024-01-05", "100.00")]));
        assert_eq!(success_rate(&summaries, Decimal::ZERO), 0.0);
    }
}
