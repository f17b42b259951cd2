use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

static COMMANDS_APPLIED: AtomicU64 = AtomicU64::new(0);
static COMMANDS_REJECTED: AtomicU64 = AtomicU64::new(0);
static RESET_COUNT: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_COUNT: AtomicU64 = AtomicU64::new(0);
static START_TIME: OnceLock<Instant> = OnceLock::new();

pub fn init_metrics() {
    START_TIME.get_or_init(Instant::now);
}

pub fn increment_applied() {
    COMMANDS_APPLIED.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_rejected() {
    COMMANDS_REJECTED.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_reset_count() {
    RESET_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_snapshot_count() {
    SNAPSHOT_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn get_metrics() -> serde_json::Value {
    let uptime = START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0);

    serde_json::json!({
        "commands_applied": COMMANDS_APPLIED.load(Ordering::Relaxed),
        "commands_rejected": COMMANDS_REJECTED.load(Ordering::Relaxed),
        "resets": RESET_COUNT.load(Ordering::Relaxed),
        "snapshots": SNAPSHOT_COUNT.load(Ordering::Relaxed),
        "uptime_seconds": uptime
    })
}
