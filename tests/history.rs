use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use wallet_ledger::history::aggregate;
use wallet_ledger::types::{TransactionRecord, TransactionStatus, TransactionTypeInfo};

fn record(id: &str, status: TransactionStatus, added_time: i64) -> TransactionRecord {
    TransactionRecord::new(
        "0xA",
        1,
        id,
        TransactionTypeInfo::Unknown { to_address: None },
        added_time,
    )
    .with_status(status)
}

fn at<Tz: TimeZone>(tz: &Tz, y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
    tz.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid time")
}

fn ids(records: &[TransactionRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn buckets_by_status_then_time() {
    let now = at(&Utc, 2024, 6, 15, 12);
    let records = vec![
        record("pending-old", TransactionStatus::Pending, at(&Utc, 2021, 1, 1, 0).timestamp_millis()),
        record("cancelling", TransactionStatus::Cancelling, now.timestamp_millis()),
        record("replacing", TransactionStatus::Replacing, now.timestamp_millis()),
        record("today", TransactionStatus::Success, at(&Utc, 2024, 6, 15, 8).timestamp_millis()),
        record("midnight", TransactionStatus::Failed, at(&Utc, 2024, 6, 15, 0).timestamp_millis()),
        record("month", TransactionStatus::Success, at(&Utc, 2024, 6, 2, 9).timestamp_millis()),
        record("month-start", TransactionStatus::Unknown, at(&Utc, 2024, 6, 1, 0).timestamp_millis()),
        record("march", TransactionStatus::Success, at(&Utc, 2024, 3, 9, 9).timestamp_millis()),
        record("last-dec", TransactionStatus::Failed, at(&Utc, 2023, 12, 31, 23).timestamp_millis()),
    ];

    let view = aggregate(records.clone(), &now);

    assert_eq!(view.combined, records);
    assert_eq!(view.len(), 9);
    assert_eq!(ids(&view.today), vec!["today", "midnight"]);
    assert_eq!(ids(&view.this_month), vec!["month", "month-start"]);
    assert_eq!(view.pending.len(), 3);
    assert!(view.pending.iter().any(|r| r.id == "pending-old"));

    let keys: Vec<_> = view.prior_by_period.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["March", "December 2023"]);
    assert_eq!(view.period("March").map(ids), Some(vec!["march"]));
    assert_eq!(view.period("December 2023").map(ids), Some(vec!["last-dec"]));
    assert!(view.period("June").is_none());
}

#[test]
fn pending_sorted_by_nonce_with_missing_nonces_first() {
    let now = at(&Utc, 2024, 6, 15, 12);
    let t = now.timestamp_millis();
    let records = vec![
        record("five", TransactionStatus::Pending, t).with_nonce(5),
        record("two", TransactionStatus::Pending, t).with_nonce(2),
        record("none", TransactionStatus::Pending, t),
        record("eight", TransactionStatus::Replacing, t).with_nonce(8),
    ];

    let view = aggregate(records, &now);
    assert_eq!(ids(&view.pending), vec!["none", "two", "five", "eight"]);
}

#[test]
fn pending_order_does_not_depend_on_input_order() {
    let now = at(&Utc, 2024, 6, 15, 12);
    let t = now.timestamp_millis();
    let records = vec![
        record("b", TransactionStatus::Pending, t),
        record("a", TransactionStatus::Pending, t),
        record("late", TransactionStatus::Pending, t - 10),
        record("n1", TransactionStatus::Pending, t).with_nonce(1),
        record("n1-early", TransactionStatus::Pending, t - 5).with_nonce(1),
    ];
    let mut reversed = records.clone();
    reversed.reverse();

    let forward = aggregate(records, &now);
    let backward = aggregate(reversed, &now);
    assert_eq!(ids(&forward.pending), vec!["late", "a", "b", "n1-early", "n1"]);
    assert_eq!(forward.pending, backward.pending);
}

#[test]
fn prior_groups_keep_input_order_within_a_period() {
    let now = at(&Utc, 2024, 6, 15, 12);
    let records = vec![
        record("feb-late", TransactionStatus::Success, at(&Utc, 2024, 2, 28, 0).timestamp_millis()),
        record("jan", TransactionStatus::Success, at(&Utc, 2024, 1, 5, 0).timestamp_millis()),
        record("feb-early", TransactionStatus::Success, at(&Utc, 2024, 2, 1, 0).timestamp_millis()),
        record("old-feb", TransactionStatus::Success, at(&Utc, 2022, 2, 1, 0).timestamp_millis()),
    ];

    let view = aggregate(records, &now);
    let keys: Vec<_> = view.prior_by_period.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["February", "January", "February 2022"]);
    assert_eq!(view.period("February").map(ids), Some(vec!["feb-late", "feb-early"]));
}

#[test]
fn cutoffs_use_the_zone_of_now() {
    // 2024-06-15 22:30 UTC is already June 16 in UTC+3
    let plus_three = FixedOffset::east_opt(3 * 3600).expect("offset");
    let late_utc = Utc.with_ymd_and_hms(2024, 6, 15, 22, 30, 0).single().expect("utc");
    let now = late_utc.with_timezone(&plus_three);

    let earlier_that_evening =
        record("evening", TransactionStatus::Success, at(&Utc, 2024, 6, 15, 20).timestamp_millis());
    let after_local_midnight =
        record("after", TransactionStatus::Success, at(&Utc, 2024, 6, 15, 21).timestamp_millis() + 60_000);

    let local = aggregate(vec![earlier_that_evening.clone(), after_local_midnight.clone()], &now);
    assert_eq!(ids(&local.today), vec!["after"]);
    assert_eq!(ids(&local.this_month), vec!["evening"]);

    let utc = aggregate(vec![earlier_that_evening, after_local_midnight], &late_utc);
    assert_eq!(utc.today.len(), 2);
}

#[test]
fn month_key_uses_local_calendar() {
    // 2024-04-30 23:00 UTC is May 1 in UTC+2, so it groups under May
    let plus_two = FixedOffset::east_opt(2 * 3600).expect("offset");
    let now = at(&plus_two, 2024, 8, 1, 12);
    let added = Utc.with_ymd_and_hms(2024, 4, 30, 23, 0, 0).single().expect("added");

    let view = aggregate(
        vec![record("t", TransactionStatus::Success, added.timestamp_millis())],
        &now,
    );
    assert_eq!(view.prior_by_period.len(), 1);
    assert_eq!(view.prior_by_period[0].key, "May");
}

#[test]
fn empty_input_gives_empty_view() {
    let view = aggregate(Vec::new(), &at(&Utc, 2024, 6, 15, 12));
    assert!(view.is_empty());
    assert!(view.pending.is_empty());
    assert!(view.prior_by_period.is_empty());
}
