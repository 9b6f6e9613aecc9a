//! Typed host-bridge contracts shared by the bridge services and the webview shell.
//!
//! This crate is the API-first boundary for the bridge. It defines the tagged command surface,
//! command results and notifications, the purchase/calendar/storage data models, and the
//! external-service traits (purchase backend, calendar provider, permission gate) together with
//! no-op and in-memory adapters. Service logic lives in `bridge_services` and the webview
//! transport stays behind `bridge_tauri`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod calendar;
pub mod command;
pub mod error;
pub mod purchase;
pub mod storage;
pub mod time;

pub use calendar::provider::{
    CalendarFuture, CalendarProvider, MemoryCalendarProvider, MemoryPermissionGate,
    NoopCalendarProvider, NoopPermissionGate, PermissionGate,
};
pub use calendar::types::{
    CalendarId, CalendarInfo, CalendarPermission, EventId, EventRequest, NewEvent, NewReminder,
};
pub use command::{
    AddEventsArgs, BridgeCommand, CommandResult, NameArgs, Notification, Payload, PurchaseArgs,
    QueryProductArgs, SaveArgs,
};
pub use error::BridgeError;
pub use purchase::backend::{
    MemoryPurchaseBackend, NoopPurchaseBackend, PurchaseBackend, PurchaseBackendFuture,
    PurchaseEventSink,
};
pub use purchase::types::{
    PricingPhase, Product, ProductDetails, ProductKind, ProductQueryOutcome,
    PurchaseConnectionState, PurchaseFlowParams, PurchaseRecord, ResponseCode, SubscriptionOffer,
    PURCHASE_NOTIFICATION_TOPIC,
};
pub use storage::name::{sanitize_storage_name, MAX_STORAGE_NAME_LEN};
pub use storage::types::{
    DeleteOutcome, StorageError, StoredFile, StoredFileEntry, STORAGE_FILE_EXTENSION,
};
pub use time::{local_time_zone_id, parse_event_instant_ms, system_time_to_unix_ms};
