//! Where candidate events come from.

use async_trait::async_trait;

use crate::date_range::DateRange;
use crate::error::EventsBotResult;
use crate::event::CalendarEvent;

#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events overlapping `range`, in calendar order.
    async fn events_in(&self, range: &DateRange) -> EventsBotResult<Vec<CalendarEvent>>;
}
