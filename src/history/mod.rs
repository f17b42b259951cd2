//! Display view over one owner's ledger records.
//!
//! The aggregation is a pure function of the records and the current time.
//! Re-run it whenever the ledger changes or the clock crosses midnight,
//! since the day/month/year cutoffs move with `now`.

pub mod conversion;

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};
use serde::Serialize;

use crate::types::transaction::TransactionRecord;

/// Records added in one calendar month before the current one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodGroup {
    /// `"March"` in the current year, `"March 2023"` otherwise.
    pub key: String,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryView {
    pub combined: Vec<TransactionRecord>,
    pub pending: Vec<TransactionRecord>,
    pub today: Vec<TransactionRecord>,
    pub this_month: Vec<TransactionRecord>,
    /// Newest period first.
    pub prior_by_period: Vec<PeriodGroup>,
}

impl HistoryView {
    pub fn period(&self, key: &str) -> Option<&[TransactionRecord]> {
        self.prior_by_period
            .iter()
            .find(|group| group.key == key)
            .map(|group| group.transactions.as_slice())
    }

    pub fn len(&self) -> usize {
        self.combined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }
}

/// Start of the local day, month and year of `now`, in unix millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cutoffs {
    day: i64,
    month: i64,
    year: i64,
}

impl Cutoffs {
    fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let month_start = today.with_day(1).unwrap_or(today);
        let year_start = month_start.with_month(1).unwrap_or(month_start);

        Self {
            day: local_midnight_ms(&tz, today),
            month: local_midnight_ms(&tz, month_start),
            year: local_midnight_ms(&tz, year_start),
        }
    }
}

fn local_midnight_ms<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(start) => start.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        // midnight skipped by a DST jump: the day starts at the first
        // local time that exists. Gaps are whole quarter hours.
        LocalResult::None => (1..=MAX_GAP_STEPS)
            .find_map(|step| {
                tz.from_local_datetime(&(midnight + Duration::minutes(GAP_STEP_MINUTES * step)))
                    .earliest()
            })
            .map(|start| start.timestamp_millis())
            .unwrap_or_else(|| tz.from_utc_datetime(&midnight).timestamp_millis()),
    }
}

const GAP_STEP_MINUTES: i64 = 15;
const MAX_GAP_STEPS: i64 = 26 * 60 / GAP_STEP_MINUTES;

/// Nonce-less records first, then ascending nonce. Ties fall back to
/// `added_time` and then `id` so the order never depends on the input.
fn pending_order(a: &TransactionRecord, b: &TransactionRecord) -> Ordering {
    a.nonce
        .cmp(&b.nonce)
        .then_with(|| a.added_time.cmp(&b.added_time))
        .then_with(|| a.id.cmp(&b.id))
}

type Period = Option<(i32, u32)>;

fn period_of<Tz: TimeZone>(tz: &Tz, added_time: i64, year_cutoff: i64) -> (Period, String)
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(added_time).single() {
        Some(added) => {
            let format = if added_time >= year_cutoff { "%B" } else { "%B %Y" };
            (Some((added.year(), added.month())), added.format(format).to_string())
        }
        None => (None, "Unknown".to_string()),
    }
}

pub fn aggregate<Tz: TimeZone>(records: Vec<TransactionRecord>, now: &DateTime<Tz>) -> HistoryView
where
    Tz::Offset: std::fmt::Display,
{
    let cutoffs = Cutoffs::at(now);
    let tz = now.timezone();

    let mut pending = Vec::new();
    let mut today = Vec::new();
    let mut this_month = Vec::new();
    let mut groups: Vec<(Period, PeriodGroup)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for record in &records {
        if record.status.is_pending() {
            pending.push(record.clone());
        } else if record.added_time >= cutoffs.day {
            today.push(record.clone());
        } else if record.added_time >= cutoffs.month {
            this_month.push(record.clone());
        } else {
            let (period, key) = period_of(&tz, record.added_time, cutoffs.year);
            let index = *group_index.entry(key.clone()).or_insert_with(|| {
                groups.push((
                    period,
                    PeriodGroup {
                        key,
                        transactions: Vec::new(),
                    },
                ));
                groups.len() - 1
            });
            groups[index].1.transactions.push(record.clone());
        }
    }

    pending.sort_by(pending_order);
    groups.sort_by(|(a, _), (b, _)| b.cmp(a));

    HistoryView {
        combined: records,
        pending,
        today,
        this_month,
        prior_by_period: groups.into_iter().map(|(_, group)| group).collect(),
    }
}

/// Aggregates against the machine's local clock and time zone.
pub fn aggregate_local(records: Vec<TransactionRecord>) -> HistoryView {
    aggregate(records, &Local::now())
}
