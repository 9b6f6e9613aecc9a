//! Calendar ingestion data types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Provider-assigned calendar identifier.
pub struct CalendarId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Provider-assigned event identifier returned by an insert.
pub struct EventId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Calendar row as enumerated by the provider.
pub struct CalendarInfo {
    /// Calendar identifier.
    pub id: CalendarId,
    /// Whether the calendar is shown to the user.
    pub visible: bool,
    /// Whether the calendar is the account's primary calendar.
    pub primary: bool,
}

impl CalendarInfo {
    /// Creates a calendar row.
    pub const fn new(id: i64, visible: bool, primary: bool) -> Self {
        Self {
            id: CalendarId(id),
            visible,
            primary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// One event in an ingestion batch, as sent by the front end.
///
/// Every field is optional on the wire; empty strings are treated like missing values.
pub struct EventRequest {
    /// Start instant (RFC 3339 or epoch milliseconds).
    #[serde(rename = "startISO", alias = "startTime")]
    pub start: String,
    /// End instant; derived from the start when empty.
    #[serde(rename = "endISO", alias = "endTime")]
    pub end: String,
    /// Event title.
    pub title: String,
    /// Optional event description.
    pub description: Option<String>,
    /// Optional event location.
    pub location: Option<String>,
    /// Reminder offsets in minutes before the event start.
    #[serde(alias = "reminders")]
    pub reminder_offsets_minutes: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Validated event row handed to the calendar provider.
pub struct NewEvent {
    /// Target calendar.
    pub calendar_id: CalendarId,
    /// Event title.
    pub title: String,
    /// Event description, omitted when empty.
    pub description: Option<String>,
    /// Event location, omitted when empty.
    pub location: Option<String>,
    /// Start in unix milliseconds.
    pub start_ms: i64,
    /// End in unix milliseconds.
    pub end_ms: i64,
    /// Time-zone identifier stored with the event.
    pub time_zone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Reminder row attached to an inserted event.
pub struct NewReminder {
    /// Event the reminder belongs to.
    pub event_id: EventId,
    /// Minutes before the event start.
    pub minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Platform permission guarding calendar access.
pub enum CalendarPermission {
    /// Read access to calendars and events.
    ReadCalendar,
    /// Write access to calendars and events.
    WriteCalendar,
}

impl CalendarPermission {
    /// Both permissions the ingestion service requires.
    pub const REQUIRED: [Self; 2] = [Self::ReadCalendar, Self::WriteCalendar];
}
