use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// UTC midnight bounds of the calendar day containing `at`, used for the
/// one-profile-view-per-day dedup.
pub fn day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .from_utc_datetime(&at.date_naive().and_hms_opt(0, 0, 0).unwrap());
    (start, start + Duration::days(1))
}

/// Whole calendar months from `from` up to `to`. Negative when `from`
/// is in a later month than `to`.
pub fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
    let from_idx = from.year() * 12 + from.month0() as i32;
    let to_idx = to.year() * 12 + to.month0() as i32;
    to_idx - from_idx
}

/// Abbreviated month name ("Jan".."Dec") for the month `offset_back`
/// calendar months before `at`.
pub fn month_label(at: DateTime<Utc>, offset_back: i32) -> String {
    let idx = at.year() * 12 + at.month0() as i32 - offset_back;
    let year = idx.div_euclid(12);
    let month0 = idx.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_bounds_cover_the_calendar_day() {
        let at = Utc.with_ymd_and_hms(2025, 3, 6, 15, 30, 0).unwrap();
        let (start, end) = day_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 6, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 7, 0, 0, 0).unwrap());
    }

    #[test]
    fn months_between_crosses_year_boundary() {
        let from = Utc.with_ymd_and_hms(2024, 11, 20, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 2, 3, 0, 0, 0).unwrap();
        assert_eq!(months_between(from, to), 3);
        assert_eq!(months_between(to, from), -3);
    }

    #[test]
    fn months_between_same_month_is_zero() {
        let a = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 5, 31, 23, 59, 59).unwrap();
        assert_eq!(months_between(a, b), 0);
    }

    #[test]
    fn month_label_walks_backwards() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(month_label(at, 0), "Jan");
        assert_eq!(month_label(at, 1), "Dec");
        assert_eq!(month_label(at, 2), "Nov");
    }
}
