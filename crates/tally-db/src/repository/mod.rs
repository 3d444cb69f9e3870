//! # Repository Module
//!
//! Database repository implementations for Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Read Side vs Write Side                              │
//! │                                                                         │
//! │  RPC command                                                           │
//! │       │                                                                 │
//! │       ├── reads ──► db.transactions().list(&filter, page)              │
//! │       │             db.reports().today_sales_summary()                 │
//! │       │             db.products().low_stock(10)                        │
//! │       │                                                                 │
//! │       └── writes ─► db.engine().create_transaction(&req, user)         │
//! │                     (engine calls product::decrement_stock and the     │
//! │                      transaction insert helpers on ONE connection)     │
//! │                                                                         │
//! │  Repositories hold a pool clone; engine helpers take a connection so   │
//! │  they can participate in an open database transaction.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - catalog and stock counters
//! - [`CategoryRepository`](category::CategoryRepository) - product categories
//! - [`TransactionRepository`](transaction::TransactionRepository) - sale queries
//! - [`ReportRepository`](report::ReportRepository) - dashboard aggregates

pub mod category;
pub mod product;
pub mod report;
pub mod transaction;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Converts a local wall-clock time to UTC.
///
/// DST gaps resolve to the earliest valid instant after the gap; folds
/// resolve to the earlier of the two candidates.
pub(crate) fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            // Inside a spring-forward gap: step forward until the clock exists.
            let mut candidate = naive;
            for _ in 0..24 * 4 {
                candidate += chrono::Duration::minutes(15);
                if let Some(dt) = Local.from_local_datetime(&candidate).earliest() {
                    return dt.with_timezone(&Utc);
                }
            }
            Utc.from_utc_datetime(&naive)
        }
    }
}

/// `[start, end)` in UTC covering the local calendar days `from..=to`.
pub(crate) fn local_day_range(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_to_utc(from.and_time(chrono::NaiveTime::MIN));
    let end_day = to.succ_opt().unwrap_or(to);
    let end = local_to_utc(end_day.and_time(chrono::NaiveTime::MIN));
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_day_range_spans_whole_days() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let (start, end) = local_day_range(day, day);
        assert!(start < end);
        // 23, 24 or 25 hours depending on DST
        let hours = (end - start).num_hours();
        assert!((23..=25).contains(&hours), "{}", hours);

        let next = day.succ_opt().unwrap();
        let (start2, end2) = local_day_range(day, next);
        assert_eq!(start2, start);
        assert!(end2 > end);
    }
}
