//! Bridge services behind the webview command channel.
//!
//! [`CommandChannel`] owns one [`PurchaseService`], one [`CalendarService`] and one
//! [`ScopedFileStore`] per session, turns every command into exactly one [`CommandResult`], and
//! hands purchase updates to the caller through a separate notification stream.
//!
//! [`CommandResult`]: bridge_host::CommandResult

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod calendar;
pub mod channel;
pub mod config;
mod external;
pub mod purchase;
pub mod storage;
pub mod telemetry;

pub use calendar::{select_calendar, AddEventsReport, BatchRejection, CalendarService, EventFailure};
pub use channel::{BridgeServices, CommandChannel, NotificationStream};
pub use config::{BridgeConfig, ConfigError, BRIDGE_CONFIG_FILE};
pub use purchase::{product_from_details, NotificationSender, ProductQueryReport, PurchaseService};
pub use storage::ScopedFileStore;
pub use telemetry::init_tracing;
