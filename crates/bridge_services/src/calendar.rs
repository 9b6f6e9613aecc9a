//! Calendar ingestion: permission gate, calendar selection and batch insertion with reminders.

use std::sync::Arc;
use std::time::Duration;

use bridge_host::{
    parse_event_instant_ms, CalendarId, CalendarInfo, CalendarPermission, CalendarProvider,
    EventRequest, NewEvent, NewReminder, PermissionGate,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::external::bounded;

/// Picks the ingestion target: the first visible primary calendar, otherwise the first visible
/// calendar in enumeration order.
pub fn select_calendar(calendars: &[CalendarInfo]) -> Option<CalendarId> {
    let mut fallback = None;
    for calendar in calendars.iter().filter(|calendar| calendar.visible) {
        if calendar.primary {
            return Some(calendar.id);
        }
        fallback.get_or_insert(calendar.id);
    }
    fallback
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Per-item failure inside an ingestion batch.
pub enum EventFailure {
    /// Empty start time or title.
    InvalidEvent,
    /// Start time that does not parse to a positive instant.
    InvalidStart,
    /// The provider did not store the event.
    InsertFailed,
}

impl EventFailure {
    /// Returns the error tag for the item at `index`.
    pub fn tag(self, index: usize) -> String {
        let prefix = match self {
            Self::InvalidEvent => "invalid_event",
            Self::InvalidStart => "invalid_start",
            Self::InsertFailed => "insert_failed",
        };
        format!("{prefix}_{index}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Reason a whole batch was rejected before any item was processed.
pub enum BatchRejection {
    /// Calendar permissions are not granted.
    Permission,
    /// The request carried no event list.
    NoEvents,
    /// No visible calendar could be resolved.
    NoCalendar,
}

impl BatchRejection {
    /// Returns the error tag reported in the batch result.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Permission => "permission",
            Self::NoEvents => "no_events",
            Self::NoCalendar => "no_calendar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// `{ok, added, errors}` result of a batch.
pub struct AddEventsReport {
    /// `true` when at least one event was inserted.
    pub ok: bool,
    /// Number of inserted events.
    pub added: usize,
    /// Error tags in item order.
    pub errors: Vec<String>,
}

impl AddEventsReport {
    fn rejected(reason: BatchRejection) -> Self {
        Self {
            ok: false,
            added: 0,
            errors: vec![reason.tag().to_string()],
        }
    }
}

/// Permission-gated calendar ingestion service.
pub struct CalendarService {
    provider: Arc<dyn CalendarProvider>,
    permissions: Arc<dyn PermissionGate>,
    timeout: Duration,
    time_zone: String,
    default_duration_ms: i64,
}

impl CalendarService {
    /// Creates the service.
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        permissions: Arc<dyn PermissionGate>,
        timeout: Duration,
        time_zone: String,
        default_duration_ms: i64,
    ) -> Self {
        Self {
            provider,
            permissions,
            timeout,
            time_zone,
            default_duration_ms,
        }
    }

    /// Returns whether both read and write calendar permissions are granted.
    pub fn has_permission(&self) -> bool {
        CalendarPermission::REQUIRED
            .iter()
            .all(|permission| self.permissions.is_granted(*permission))
    }

    /// Prompts for calendar permissions when missing and returns the re-checked grant.
    pub async fn request_permissions(&self) -> bool {
        if self.has_permission() {
            return true;
        }
        let prompt = self.permissions.request(&CalendarPermission::REQUIRED);
        if bounded("Calendar.requestPermissions", self.timeout, prompt)
            .await
            .is_err()
        {
            debug!("permission prompt still open; reporting current grant");
        }
        self.has_permission()
    }

    /// Enumerates calendars and applies [`select_calendar`].
    pub async fn resolve_calendar_id(&self) -> Option<CalendarId> {
        match bounded("Calendar.calendars", self.timeout, self.provider.calendars()).await {
            Ok(Ok(calendars)) => select_calendar(&calendars),
            Ok(Err(err)) => {
                debug!(error = %err, "calendar enumeration failed");
                None
            }
            Err(_) => None,
        }
    }

    /// Inserts a batch of events, continuing past individual failures.
    ///
    /// `None` means the caller sent no list. The result is `ok` when at least one event was
    /// inserted.
    pub async fn add_events(&self, events: Option<&[EventRequest]>) -> AddEventsReport {
        if !self.has_permission() {
            return AddEventsReport::rejected(BatchRejection::Permission);
        }
        let Some(events) = events else {
            return AddEventsReport::rejected(BatchRejection::NoEvents);
        };
        let Some(calendar_id) = self.resolve_calendar_id().await else {
            return AddEventsReport::rejected(BatchRejection::NoCalendar);
        };

        let mut added = 0;
        let mut errors = Vec::new();
        for (index, request) in events.iter().enumerate() {
            match self.insert_one(calendar_id, request).await {
                Ok(()) => added += 1,
                Err(failure) => {
                    debug!(index, ?failure, "calendar event skipped");
                    errors.push(failure.tag(index));
                }
            }
        }
        info!(added, failed = errors.len(), "calendar batch ingested");
        AddEventsReport {
            ok: added > 0,
            added,
            errors,
        }
    }

    async fn insert_one(
        &self,
        calendar_id: CalendarId,
        request: &EventRequest,
    ) -> Result<(), EventFailure> {
        if request.start.is_empty() || request.title.is_empty() {
            return Err(EventFailure::InvalidEvent);
        }
        let start_ms = parse_event_instant_ms(&request.start)
            .filter(|start| *start > 0)
            .ok_or(EventFailure::InvalidStart)?;
        let end_ms = if request.end.trim().is_empty() {
            None
        } else {
            parse_event_instant_ms(&request.end)
        }
        .unwrap_or_else(|| start_ms.saturating_add(self.default_duration_ms));

        let event = NewEvent {
            calendar_id,
            title: request.title.clone(),
            description: non_empty(request.description.as_deref()),
            location: non_empty(request.location.as_deref()),
            start_ms,
            end_ms,
            time_zone: self.time_zone.clone(),
        };
        let event_id = match bounded(
            "Calendar.insertEvent",
            self.timeout,
            self.provider.insert_event(&event),
        )
        .await
        {
            Ok(Ok(Some(event_id))) => event_id,
            Ok(Ok(None)) => return Err(EventFailure::InsertFailed),
            Ok(Err(err)) => {
                debug!(error = %err, "calendar insert failed");
                return Err(EventFailure::InsertFailed);
            }
            Err(_) => return Err(EventFailure::InsertFailed),
        };

        for minutes in request
            .reminder_offsets_minutes
            .iter()
            .copied()
            .filter(|minutes| *minutes > 0)
        {
            let reminder = NewReminder { event_id, minutes };
            match bounded(
                "Calendar.insertReminder",
                self.timeout,
                self.provider.insert_reminder(&reminder),
            )
            .await
            {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!(?event_id, minutes, error = %err, "reminder dropped"),
                Err(_) => debug!(?event_id, minutes, "reminder dropped after timeout"),
            }
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
