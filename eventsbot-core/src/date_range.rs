//! Date range for filtering events.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// Inclusive date range, both ends in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// The current week: Monday 00:00:00 through Sunday 23:59:59 UTC.
    pub fn current_week() -> Self {
        Self::week_of(Utc::now())
    }

    /// The Monday-to-Sunday week containing `reference`.
    pub fn week_of(reference: DateTime<Utc>) -> Self {
        let monday = reference.date_naive()
            - Duration::days(i64::from(reference.weekday().num_days_from_monday()));
        let from = monday.and_time(NaiveTime::MIN).and_utc();
        let to = from + Duration::days(7) - Duration::seconds(1);

        DateRange { from, to }
    }

    /// Whether an event spanning `[start, end)` overlaps this range.
    ///
    /// The end is exclusive, so an event ending exactly at `from` belongs
    /// to the previous range. Zero-length events count at their start.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start > self.to {
            return false;
        }
        if end <= start {
            return start >= self.from;
        }
        end > self.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_week_of_midweek() {
        // Wednesday
        let range = DateRange::week_of(Utc.with_ymd_and_hms(2024, 3, 20, 15, 30, 0).unwrap());
        assert_eq!(range.from, Utc.with_ymd_and_hms(2024, 3, 18, 0, 0, 0).unwrap());
        assert_eq!(range.to, Utc.with_ymd_and_hms(2024, 3, 24, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_week_of_boundaries() {
        let monday = Utc.with_ymd_and_hms(2024, 3, 18, 0, 0, 0).unwrap();
        assert_eq!(DateRange::week_of(monday).from, monday);

        let sunday_night = Utc.with_ymd_and_hms(2024, 3, 24, 23, 59, 59).unwrap();
        assert_eq!(DateRange::week_of(sunday_night).from, monday);
    }

    #[test]
    fn test_overlaps() {
        let range = DateRange::week_of(Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap());
        let at = |d, h| Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap();

        assert!(range.overlaps(at(20, 10), at(20, 11)));
        // Started the Sunday before, still running on Monday
        assert!(range.overlaps(at(17, 22), at(18, 2)));
        assert!(!range.overlaps(at(17, 10), at(17, 11)));
        assert!(!range.overlaps(at(25, 0), at(25, 1)));
        // Zero-length event on the last second
        let last = range.to;
        assert!(range.overlaps(last, last));
        assert!(range.overlaps(range.from, range.from));
    }

    #[test]
    fn test_event_ending_at_monday_midnight_is_last_week() {
        let range = DateRange::week_of(Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap());
        let monday = range.from;

        // All-day event on the Sunday before
        assert!(!range.overlaps(monday - Duration::days(1), monday));
        // Evening show ending at midnight
        assert!(!range.overlaps(monday - Duration::hours(2), monday));
        assert!(range.overlaps(monday - Duration::hours(2), monday + Duration::seconds(1)));
    }
}
