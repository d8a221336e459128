//! Time utilities

use chrono::{Local, TimeZone};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Start of the current local calendar day, in Unix milliseconds
///
/// Used as the lower bound of the today-status query; attendance days are
/// calendar days in the device's local time zone.
pub fn start_of_today_millis() -> i64 {
    let now = Local::now();
    let midnight = now.date_naive().and_hms_opt(0, 0, 0).expect("valid midnight");
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis())
}
