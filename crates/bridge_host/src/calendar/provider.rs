//! Calendar provider and permission contracts plus no-op and in-memory adapters.

use std::{
    collections::HashSet,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard},
};

use super::types::{CalendarInfo, CalendarPermission, EventId, NewEvent, NewReminder};

/// Object-safe boxed future used by [`CalendarProvider`] and [`PermissionGate`].
pub type CalendarFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// External calendar content provider.
pub trait CalendarProvider: Send + Sync {
    /// Enumerates calendars in provider order.
    fn calendars(&self) -> CalendarFuture<'_, Result<Vec<CalendarInfo>, String>>;

    /// Inserts an event; `Ok(None)` means the provider declined the row.
    fn insert_event<'a>(
        &'a self,
        event: &'a NewEvent,
    ) -> CalendarFuture<'a, Result<Option<EventId>, String>>;

    /// Inserts a reminder row for an existing event.
    fn insert_reminder<'a>(&'a self, reminder: &'a NewReminder)
        -> CalendarFuture<'a, Result<(), String>>;
}

/// Platform permission system seen as a boolean check plus a prompt side effect.
pub trait PermissionGate: Send + Sync {
    /// Returns whether `permission` is currently granted.
    fn is_granted(&self, permission: CalendarPermission) -> bool;

    /// Shows the platform prompt for `permissions`; completes when the prompt is dismissed.
    fn request<'a>(&'a self, permissions: &'a [CalendarPermission]) -> CalendarFuture<'a, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Calendar provider for hosts without a calendar store.
pub struct NoopCalendarProvider;

impl CalendarProvider for NoopCalendarProvider {
    fn calendars(&self) -> CalendarFuture<'_, Result<Vec<CalendarInfo>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn insert_event<'a>(
        &'a self,
        _event: &'a NewEvent,
    ) -> CalendarFuture<'a, Result<Option<EventId>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn insert_reminder<'a>(
        &'a self,
        _reminder: &'a NewReminder,
    ) -> CalendarFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Permission gate that never grants anything.
pub struct NoopPermissionGate;

impl PermissionGate for NoopPermissionGate {
    fn is_granted(&self, _permission: CalendarPermission) -> bool {
        false
    }

    fn request<'a>(&'a self, _permissions: &'a [CalendarPermission]) -> CalendarFuture<'a, ()> {
        Box::pin(async {})
    }
}

#[derive(Debug, Default)]
struct MemoryCalendarState {
    calendars: Vec<CalendarInfo>,
    events: Vec<(EventId, NewEvent)>,
    reminders: Vec<NewReminder>,
    rejected_titles: HashSet<String>,
    failing_titles: HashSet<String>,
    reminders_fail: bool,
    next_event_id: i64,
}

#[derive(Debug, Clone, Default)]
/// In-memory calendar provider with scriptable insert failures.
pub struct MemoryCalendarProvider {
    inner: Arc<Mutex<MemoryCalendarState>>,
}

impl MemoryCalendarProvider {
    fn state(&self) -> MutexGuard<'_, MemoryCalendarState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates a provider enumerating `calendars` in the given order.
    pub fn with_calendars(calendars: Vec<CalendarInfo>) -> Self {
        let provider = Self::default();
        provider.state().calendars = calendars;
        provider
    }

    /// Makes inserts of events titled `title` return no row.
    pub fn reject_title(&self, title: impl Into<String>) {
        self.state().rejected_titles.insert(title.into());
    }

    /// Makes inserts of events titled `title` fail with an error.
    pub fn fail_title(&self, title: impl Into<String>) {
        self.state().failing_titles.insert(title.into());
    }

    /// Makes every reminder insert fail.
    pub fn fail_reminders(&self) {
        self.state().reminders_fail = true;
    }

    /// Returns inserted events in insertion order.
    pub fn events(&self) -> Vec<(EventId, NewEvent)> {
        self.state().events.clone()
    }

    /// Returns inserted reminders in insertion order.
    pub fn reminders(&self) -> Vec<NewReminder> {
        self.state().reminders.clone()
    }
}

impl CalendarProvider for MemoryCalendarProvider {
    fn calendars(&self) -> CalendarFuture<'_, Result<Vec<CalendarInfo>, String>> {
        Box::pin(async move { Ok(self.state().calendars.clone()) })
    }

    fn insert_event<'a>(
        &'a self,
        event: &'a NewEvent,
    ) -> CalendarFuture<'a, Result<Option<EventId>, String>> {
        Box::pin(async move {
            let mut state = self.state();
            if state.failing_titles.contains(&event.title) {
                return Err(format!("provider refused event `{}`", event.title));
            }
            if state.rejected_titles.contains(&event.title) {
                return Ok(None);
            }
            state.next_event_id += 1;
            let id = EventId(state.next_event_id);
            state.events.push((id, event.clone()));
            Ok(Some(id))
        })
    }

    fn insert_reminder<'a>(
        &'a self,
        reminder: &'a NewReminder,
    ) -> CalendarFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut state = self.state();
            if state.reminders_fail {
                return Err(format!("provider refused reminder for {:?}", reminder.event_id));
            }
            state.reminders.push(*reminder);
            Ok(())
        })
    }
}

#[derive(Debug, Default)]
struct MemoryPermissionState {
    granted: HashSet<CalendarPermission>,
    grant_on_request: bool,
    requests: usize,
}

#[derive(Debug, Clone, Default)]
/// In-memory permission gate; optionally grants whatever the prompt asks for.
pub struct MemoryPermissionGate {
    inner: Arc<Mutex<MemoryPermissionState>>,
}

impl MemoryPermissionGate {
    fn state(&self) -> MutexGuard<'_, MemoryPermissionState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates a gate with every calendar permission already granted.
    pub fn granted() -> Self {
        let gate = Self::default();
        gate.state().granted.extend(CalendarPermission::REQUIRED);
        gate
    }

    /// Creates a gate that grants permissions when the prompt is shown.
    pub fn granting_on_request() -> Self {
        let gate = Self::default();
        gate.state().grant_on_request = true;
        gate
    }

    /// Grants a single permission.
    pub fn grant(&self, permission: CalendarPermission) {
        self.state().granted.insert(permission);
    }

    /// Returns how many prompts were shown.
    pub fn request_count(&self) -> usize {
        self.state().requests
    }
}

impl PermissionGate for MemoryPermissionGate {
    fn is_granted(&self, permission: CalendarPermission) -> bool {
        self.state().granted.contains(&permission)
    }

    fn request<'a>(&'a self, permissions: &'a [CalendarPermission]) -> CalendarFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state();
            state.requests += 1;
            if state.grant_on_request {
                state.granted.extend(permissions.iter().copied());
            }
        })
    }
}
