use std::sync::Arc;
use std::time::Duration;

use bridge_host::{
    CalendarFuture, CalendarId, CalendarInfo, CalendarPermission, CalendarProvider, EventId,
    EventRequest, MemoryCalendarProvider, MemoryPermissionGate, NewEvent, NewReminder,
    PermissionGate,
};
use bridge_services::{AddEventsReport, CalendarService};
use pretty_assertions::assert_eq;

const HOUR_MS: i64 = 3_600_000;

fn service(provider: &MemoryCalendarProvider, gate: &MemoryPermissionGate) -> CalendarService {
    CalendarService::new(
        Arc::new(provider.clone()),
        Arc::new(gate.clone()),
        Duration::from_secs(5),
        "Europe/Lisbon".into(),
        HOUR_MS,
    )
}

fn request(start: &str, title: &str) -> EventRequest {
    EventRequest {
        start: start.into(),
        title: title.into(),
        ..EventRequest::default()
    }
}

fn two_calendars() -> MemoryCalendarProvider {
    MemoryCalendarProvider::with_calendars(vec![
        CalendarInfo::new(1, true, false),
        CalendarInfo::new(2, true, true),
    ])
}

#[tokio::test]
async fn primary_calendar_is_selected_over_first_visible() {
    let provider = two_calendars();
    let svc = service(&provider, &MemoryPermissionGate::granted());
    assert_eq!(svc.resolve_calendar_id().await, Some(CalendarId(2)));

    let report = svc
        .add_events(Some(&[request("2026-05-01T08:00:00Z", "Flight")]))
        .await;
    assert!(report.ok);
    assert_eq!(provider.events()[0].1.calendar_id, CalendarId(2));
}

#[tokio::test]
async fn batch_rejections_are_tagged_distinctly() {
    let provider = two_calendars();
    let denied = service(&provider, &MemoryPermissionGate::default());
    assert_eq!(
        denied.add_events(Some(&[request("1", "x")])).await,
        AddEventsReport {
            ok: false,
            added: 0,
            errors: vec!["permission".into()],
        }
    );

    let granted = service(&provider, &MemoryPermissionGate::granted());
    assert_eq!(granted.add_events(None).await.errors, vec!["no_events"]);

    let hidden = MemoryCalendarProvider::with_calendars(vec![CalendarInfo::new(7, false, true)]);
    let no_calendar = service(&hidden, &MemoryPermissionGate::granted());
    assert_eq!(
        no_calendar.add_events(Some(&[])).await,
        AddEventsReport {
            ok: false,
            added: 0,
            errors: vec!["no_calendar".into()],
        }
    );
    assert!(provider.events().is_empty());
}

#[tokio::test]
async fn partial_failures_are_aggregated_in_item_order() {
    let provider = two_calendars();
    provider.reject_title("Declined");
    provider.fail_title("Broken");
    let svc = service(&provider, &MemoryPermissionGate::granted());

    let batch = [
        request("2026-05-01T08:00:00Z", "Flight"),
        request("", "No start"),
        request("2026-05-01T08:00:00Z", ""),
        request("next tuesday", "Bad start"),
        request("0", "Zero start"),
        request("   ", "Blank start"),
        request("2026-05-02T08:00:00Z", "Declined"),
        request("2026-05-03T08:00:00Z", "Broken"),
        request("1770000000000", "Hotel"),
    ];
    let report = svc.add_events(Some(&batch)).await;

    assert_eq!(
        report,
        AddEventsReport {
            ok: true,
            added: 2,
            errors: vec![
                "invalid_event_1".into(),
                "invalid_event_2".into(),
                "invalid_start_3".into(),
                "invalid_start_4".into(),
                "invalid_start_5".into(),
                "insert_failed_6".into(),
                "insert_failed_7".into(),
            ],
        }
    );
    let titles: Vec<String> = provider
        .events()
        .into_iter()
        .map(|(_, event)| event.title)
        .collect();
    assert_eq!(titles, vec!["Flight", "Hotel"]);
}

#[tokio::test]
async fn invalid_items_never_exceed_their_share() {
    let provider = two_calendars();
    let svc = service(&provider, &MemoryPermissionGate::granted());
    let batch: Vec<EventRequest> = (0..10)
        .map(|index| {
            if index % 3 == 0 {
                request("", "missing start")
            } else {
                request("2026-06-01T10:00:00Z", "ok")
            }
        })
        .collect();
    let invalid = batch.iter().filter(|item| item.start.is_empty()).count();

    let report = svc.add_events(Some(&batch)).await;
    assert!(report.added <= batch.len() - invalid);
    assert_eq!(
        report
            .errors
            .iter()
            .filter(|tag| tag.starts_with("invalid_event_"))
            .count(),
        invalid
    );
}

#[tokio::test]
async fn all_failing_batch_is_not_ok() {
    let provider = two_calendars();
    let svc = service(&provider, &MemoryPermissionGate::granted());
    let report = svc.add_events(Some(&[request("", "")])).await;
    assert_eq!(
        report,
        AddEventsReport {
            ok: false,
            added: 0,
            errors: vec!["invalid_event_0".into()],
        }
    );
}

#[tokio::test]
async fn end_defaults_to_one_hour_and_fields_are_carried() {
    let provider = two_calendars();
    let svc = service(&provider, &MemoryPermissionGate::granted());
    let batch = [
        EventRequest {
            description: Some("Gate 4".into()),
            location: Some(String::new()),
            ..request("1970-01-01T00:00:10Z", "Flight")
        },
        EventRequest {
            end: "1970-01-01T03:00:00Z".into(),
            ..request("1970-01-01T01:00:00Z", "Museum")
        },
        EventRequest {
            end: "garbage".into(),
            ..request("1970-01-01T02:00:00Z", "Dinner")
        },
    ];
    svc.add_events(Some(&batch)).await;

    let events = provider.events();
    let (_, flight) = &events[0];
    assert_eq!(flight.start_ms, 10_000);
    assert_eq!(flight.end_ms, 10_000 + HOUR_MS);
    assert_eq!(flight.description.as_deref(), Some("Gate 4"));
    assert_eq!(flight.location, None);
    assert_eq!(flight.time_zone, "Europe/Lisbon");

    let (_, museum) = &events[1];
    assert_eq!(museum.end_ms - museum.start_ms, 2 * HOUR_MS);

    let (_, dinner) = &events[2];
    assert_eq!(dinner.end_ms - dinner.start_ms, HOUR_MS);
}

#[tokio::test]
async fn positive_reminders_attach_to_inserted_event() {
    let provider = two_calendars();
    let svc = service(&provider, &MemoryPermissionGate::granted());
    let batch = [EventRequest {
        reminder_offsets_minutes: vec![60, 0, -5, 10],
        ..request("2026-05-01T08:00:00Z", "Flight")
    }];
    let report = svc.add_events(Some(&batch)).await;
    assert_eq!(report.added, 1);
    assert_eq!(
        provider.reminders(),
        vec![
            NewReminder {
                event_id: EventId(1),
                minutes: 60
            },
            NewReminder {
                event_id: EventId(1),
                minutes: 10
            },
        ]
    );
}

#[tokio::test]
async fn reminder_failures_do_not_fail_the_event() {
    let provider = two_calendars();
    provider.fail_reminders();
    let svc = service(&provider, &MemoryPermissionGate::granted());
    let batch = [EventRequest {
        reminder_offsets_minutes: vec![30],
        ..request("2026-05-01T08:00:00Z", "Flight")
    }];
    let report = svc.add_events(Some(&batch)).await;
    assert_eq!(
        report,
        AddEventsReport {
            ok: true,
            added: 1,
            errors: Vec::new(),
        }
    );
    assert!(provider.reminders().is_empty());
}

#[tokio::test]
async fn request_permissions_prompts_only_when_missing() {
    let provider = two_calendars();

    let granted = MemoryPermissionGate::granted();
    assert!(service(&provider, &granted).request_permissions().await);
    assert_eq!(granted.request_count(), 0);

    let partial = MemoryPermissionGate::default();
    partial.grant(CalendarPermission::ReadCalendar);
    let svc = service(&provider, &partial);
    assert!(!svc.has_permission());
    assert!(!svc.request_permissions().await);
    assert_eq!(partial.request_count(), 1);

    let prompting = MemoryPermissionGate::granting_on_request();
    let svc = service(&provider, &prompting);
    assert!(svc.request_permissions().await);
    assert!(svc.has_permission());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stall {
    Calendars,
    InsertTitled(&'static str),
    Reminders,
}

/// Memory provider whose chosen operation never completes.
struct StallingCalendar {
    inner: MemoryCalendarProvider,
    stall: Stall,
}

impl CalendarProvider for StallingCalendar {
    fn calendars(&self) -> CalendarFuture<'_, Result<Vec<CalendarInfo>, String>> {
        if self.stall == Stall::Calendars {
            return Box::pin(futures::future::pending());
        }
        self.inner.calendars()
    }

    fn insert_event<'a>(
        &'a self,
        event: &'a NewEvent,
    ) -> CalendarFuture<'a, Result<Option<EventId>, String>> {
        if matches!(self.stall, Stall::InsertTitled(title) if event.title == title) {
            return Box::pin(futures::future::pending());
        }
        self.inner.insert_event(event)
    }

    fn insert_reminder<'a>(
        &'a self,
        reminder: &'a NewReminder,
    ) -> CalendarFuture<'a, Result<(), String>> {
        if self.stall == Stall::Reminders {
            return Box::pin(futures::future::pending());
        }
        self.inner.insert_reminder(reminder)
    }
}

/// Gate whose prompt applies its grant and then stays open.
struct OpenPromptGate(MemoryPermissionGate);

impl PermissionGate for OpenPromptGate {
    fn is_granted(&self, permission: CalendarPermission) -> bool {
        self.0.is_granted(permission)
    }

    fn request<'a>(&'a self, permissions: &'a [CalendarPermission]) -> CalendarFuture<'a, ()> {
        Box::pin(async move {
            self.0.request(permissions).await;
            futures::future::pending::<()>().await;
        })
    }
}

fn stalling_service(stall: Stall) -> (CalendarService, MemoryCalendarProvider) {
    let inner = two_calendars();
    let svc = CalendarService::new(
        Arc::new(StallingCalendar {
            inner: inner.clone(),
            stall,
        }),
        Arc::new(MemoryPermissionGate::granted()),
        Duration::from_millis(20),
        "UTC".into(),
        HOUR_MS,
    );
    (svc, inner)
}

#[tokio::test]
async fn stalled_calendar_enumeration_reports_no_calendar() {
    let (svc, inner) = stalling_service(Stall::Calendars);
    assert_eq!(svc.resolve_calendar_id().await, None);
    assert_eq!(
        svc.add_events(Some(&[request("2026-05-01T08:00:00Z", "Flight")]))
            .await,
        AddEventsReport {
            ok: false,
            added: 0,
            errors: vec!["no_calendar".into()],
        }
    );
    assert!(inner.events().is_empty());
}

#[tokio::test]
async fn stalled_insert_fails_only_that_item() {
    let (svc, inner) = stalling_service(Stall::InsertTitled("Stuck"));
    let batch = [
        request("2026-05-01T08:00:00Z", "Stuck"),
        request("2026-05-01T09:00:00Z", "Flight"),
    ];
    assert_eq!(
        svc.add_events(Some(&batch)).await,
        AddEventsReport {
            ok: true,
            added: 1,
            errors: vec!["insert_failed_0".into()],
        }
    );
    assert_eq!(inner.events().len(), 1);
}

#[tokio::test]
async fn stalled_reminder_is_swallowed() {
    let (svc, inner) = stalling_service(Stall::Reminders);
    let batch = [EventRequest {
        reminder_offsets_minutes: vec![15, 30],
        ..request("2026-05-01T08:00:00Z", "Flight")
    }];
    assert_eq!(
        svc.add_events(Some(&batch)).await,
        AddEventsReport {
            ok: true,
            added: 1,
            errors: Vec::new(),
        }
    );
    assert_eq!(inner.events().len(), 1);
    assert!(inner.reminders().is_empty());
}

#[tokio::test]
async fn open_permission_prompt_reports_current_grant() {
    let provider = two_calendars();
    let build = |gate: MemoryPermissionGate| {
        CalendarService::new(
            Arc::new(provider.clone()),
            Arc::new(OpenPromptGate(gate)),
            Duration::from_millis(20),
            "UTC".into(),
            HOUR_MS,
        )
    };

    let granting = MemoryPermissionGate::granting_on_request();
    assert!(build(granting.clone()).request_permissions().await);
    assert_eq!(granting.request_count(), 1);

    let denying = MemoryPermissionGate::default();
    assert!(!build(denying.clone()).request_permissions().await);
    assert_eq!(denying.request_count(), 1);
}
