use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Day-ahead spot prices are released once per calendar day at a fixed
/// UTC hour (`release_hour`, 0–23, taken from config rather than
/// hard-coded — spec.md §9 flags the source's two inconsistent release
/// hours as an open question this crate resolves by configuration). The
/// effective horizon is the next release time if `now` is still within
/// today's pre-release window, otherwise the end of the day after
/// tomorrow (the last instant a release made at that hour could possibly
/// cover).
pub fn next_release(now: DateTime<Utc>, release_hour: u32) -> DateTime<Utc> {
    let today_release = Utc
        .with_ymd_and_hms(now.year(), now.month(), now.day(), release_hour, 0, 0)
        .single()
        .expect("release_hour is a valid hour-of-day");

    if now < today_release {
        today_release
    } else {
        end_of_day_after_tomorrow(now)
    }
}

fn end_of_day_after_tomorrow(now: DateTime<Utc>) -> DateTime<Utc> {
    let day_after_tomorrow = now.date_naive() + chrono::Duration::days(2);
    Utc.from_utc_datetime(&day_after_tomorrow.and_hms_opt(23, 59, 59).unwrap())
}
