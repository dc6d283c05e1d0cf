//! ICS feed parsing.
//!
//! Turns the text of a calendar feed into the [`CalendarEvent`]s overlapping
//! a date range, expanding recurring events on the way.

mod event;
mod parse;

use std::collections::{HashMap, HashSet};

use tracing::warn;

pub use event::{EventStatus, EventTime, IcsEvent, Recurrence};
pub use parse::parse_calendar;

use crate::date_range::DateRange;
use crate::error::EventsBotResult;
use crate::event::CalendarEvent;
use crate::recurrence::expand_recurring_event;

/// Events of a feed overlapping `range`, in feed order.
///
/// Recurring masters are replaced by their instances (chronological, at the
/// master's position). Cancelled events are dropped. A master whose rule
/// cannot be expanded is kept as a single event.
pub fn events_in_range(content: &str, range: &DateRange) -> EventsBotResult<Vec<CalendarEvent>> {
    let events = parse_calendar(content)?;

    let mut overridden: HashMap<&str, HashSet<i64>> = HashMap::new();
    for event in &events {
        if let Some(recurrence_id) = &event.recurrence_id {
            overridden
                .entry(event.uid.as_str())
                .or_default()
                .insert(recurrence_id.to_utc().timestamp());
        }
    }

    let no_overrides = HashSet::new();
    let mut in_range = Vec::new();

    for event in &events {
        if event.status == EventStatus::Cancelled {
            continue;
        }

        if event.is_master() {
            let skip = overridden.get(event.uid.as_str()).unwrap_or(&no_overrides);
            match expand_recurring_event(event, range, skip) {
                Ok(instances) => {
                    in_range.extend(instances.iter().map(IcsEvent::to_calendar_event));
                    continue;
                }
                Err(e) => warn!(uid = %event.uid, error = %e, "Unable to expand recurring event"),
            }
        }

        if range.overlaps(event.start.to_utc(), event.end.to_utc()) {
            in_range.push(event.to_calendar_event());
        }
    }

    Ok(in_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const FEED: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:single
SUMMARY:Game night
LOCATION:Library
DTSTART;TZID=Europe/Paris:20240321T190000
DTEND;TZID=Europe/Paris:20240321T230000
END:VEVENT
BEGIN:VEVENT
UID:weekly
SUMMARY:Weekly sync
DTSTART:20240101T100000Z
DTEND:20240101T110000Z
RRULE:FREQ=WEEKLY;BYDAY=MO,FR
END:VEVENT
BEGIN:VEVENT
UID:weekly
RECURRENCE-ID:20240322T100000Z
SUMMARY:Weekly sync (moved)
DTSTART:20240322T140000Z
DTEND:20240322T150000Z
END:VEVENT
BEGIN:VEVENT
UID:cancelled
SUMMARY:Called off
STATUS:CANCELLED
DTSTART:20240319T100000Z
DTEND:20240319T110000Z
END:VEVENT
BEGIN:VEVENT
UID:next-week
SUMMARY:Too late
DTSTART:20240326T100000Z
DTEND:20240326T110000Z
END:VEVENT
END:VCALENDAR"#;

    fn week() -> DateRange {
        DateRange::week_of(Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_events_in_range() {
        let events = events_in_range(FEED, &week()).expect("Should parse");
        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["Game night", "Weekly sync", "Weekly sync (moved)"]);
    }

    #[test]
    fn test_zoned_times_are_normalized_to_utc() {
        let events = events_in_range(FEED, &week()).expect("Should parse");

        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2024, 3, 21, 18, 0, 0).unwrap());
        assert_eq!(events[0].end, Utc.with_ymd_and_hms(2024, 3, 21, 22, 0, 0).unwrap());
        assert_eq!(events[0].location.as_deref(), Some("Library"));
    }

    #[test]
    fn test_override_replaces_generated_instance() {
        let events = events_in_range(FEED, &week()).expect("Should parse");

        let weekly: Vec<_> = events.iter().filter(|e| e.name.starts_with("Weekly")).collect();
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].start, Utc.with_ymd_and_hms(2024, 3, 18, 10, 0, 0).unwrap());
        assert_eq!(weekly[1].start, Utc.with_ymd_and_hms(2024, 3, 22, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        assert!(events_in_range("this is not a calendar", &week()).is_err());
    }

    #[test]
    fn test_events_ending_at_week_start_are_excluded() {
        let feed = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:fair
SUMMARY:Last Sunday fair
DTSTART;VALUE=DATE:20240317
DTEND;VALUE=DATE:20240318
END:VEVENT
BEGIN:VEVENT
UID:late-show
SUMMARY:Sunday late show
DTSTART:20240317T220000Z
DTEND:20240318T000000Z
END:VEVENT
BEGIN:VEVENT
UID:market
SUMMARY:Monday market
DTSTART;VALUE=DATE:20240318
DTEND;VALUE=DATE:20240319
END:VEVENT
END:VCALENDAR"#;

        let events = events_in_range(feed, &week()).expect("Should parse");
        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["Monday market"]);
    }
}
