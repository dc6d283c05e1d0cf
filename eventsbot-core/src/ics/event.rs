//! Feed-level event types, as read from a VEVENT component.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{CalendarDateTime, DatePerhapsTime};

use crate::event::CalendarEvent;

/// A VEVENT as found in the feed, before recurrence expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct IcsEvent {
    pub uid: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub status: EventStatus,
    /// RRULE and EXDATEs, set on recurring master events
    pub recurrence: Option<Recurrence>,
    /// Original start of the instance this component overrides
    pub recurrence_id: Option<EventTime>,
}

impl IcsEvent {
    pub fn is_master(&self) -> bool {
        self.recurrence.is_some() && self.recurrence_id.is_none()
    }

    pub fn to_calendar_event(&self) -> CalendarEvent {
        CalendarEvent {
            name: self.summary.clone(),
            description: self.description.clone(),
            start: self.start.to_utc(),
            end: self.end.to_utc(),
            location: self.location.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recurrence {
    pub rrule: String,
    pub exdates: Vec<EventTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    /// Read a STATUS value; anything unknown counts as confirmed.
    pub fn from_ics(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "CANCELLED" => EventStatus::Cancelled,
            "TENTATIVE" => EventStatus::Tentative,
            _ => EventStatus::Confirmed,
        }
    }
}

/// A DTSTART/DTEND-style value, keeping the form it had in the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// Resolve to an instant.
    ///
    /// All-day dates start at midnight UTC and floating times are read as
    /// UTC. Zones unknown to the tz database also fall back to UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
            EventTime::DateTimeUtc(dt) => *dt,
            EventTime::DateTimeFloating(dt) => dt.and_utc(),
            EventTime::DateTimeZoned { datetime, tzid } => match tzid.parse::<Tz>() {
                Ok(tz) => match tz.from_local_datetime(datetime).earliest() {
                    Some(dt) => dt.with_timezone(&Utc),
                    // Skipped by a forward transition: read with the offset
                    // in effect before the gap.
                    None => {
                        let before = tz.offset_from_utc_datetime(&(*datetime - Duration::days(1)));
                        let offset = Duration::seconds(i64::from(before.fix().local_minus_utc()));
                        (*datetime - offset).and_utc()
                    }
                },
                Err(_) => datetime.and_utc(),
            },
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// The same kind of time, `by` later. Dates move by whole days.
    pub fn shifted_by(&self, by: Duration) -> EventTime {
        match self {
            EventTime::Date(d) => EventTime::Date(*d + Duration::days(by.num_days())),
            EventTime::DateTimeUtc(dt) => EventTime::DateTimeUtc(*dt + by),
            EventTime::DateTimeFloating(dt) => EventTime::DateTimeFloating(*dt + by),
            EventTime::DateTimeZoned { datetime, tzid } => EventTime::DateTimeZoned {
                datetime: *datetime + by,
                tzid: tzid.clone(),
            },
        }
    }
}

impl From<DatePerhapsTime> for EventTime {
    fn from(value: DatePerhapsTime) -> Self {
        match value {
            DatePerhapsTime::Date(date) => EventTime::Date(date),
            DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => EventTime::DateTimeUtc(dt),
            DatePerhapsTime::DateTime(CalendarDateTime::Floating(dt)) => {
                EventTime::DateTimeFloating(dt)
            }
            DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        }
    }
}
