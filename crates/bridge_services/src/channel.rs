//! Command channel: decodes commands, routes them to their service and produces exactly one
//! terminal result per invocation.

use std::path::PathBuf;
use std::sync::Arc;

use bridge_host::{
    local_time_zone_id, BridgeCommand, BridgeError, CalendarProvider, CommandResult, NameArgs,
    Notification, Payload, PermissionGate, ProductKind, PurchaseBackend, SaveArgs, StorageError,
};
use futures::channel::mpsc::{self, UnboundedReceiver};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::calendar::CalendarService;
use crate::config::BridgeConfig;
use crate::purchase::PurchaseService;
use crate::storage::ScopedFileStore;

/// Receiving half of the session notification channel.
///
/// Dropping it ends delivery; pending commands are unaffected.
pub type NotificationStream = UnboundedReceiver<Notification>;

/// External collaborators wired into a channel.
pub struct BridgeServices {
    /// Platform purchase SDK.
    pub purchase_backend: Arc<dyn PurchaseBackend>,
    /// Platform calendar content provider.
    pub calendar_provider: Arc<dyn CalendarProvider>,
    /// Platform permission system.
    pub permissions: Arc<dyn PermissionGate>,
    /// Private directory for sandboxed storage.
    pub storage_root: PathBuf,
}

/// Session-scoped dispatcher owning one instance of every service.
pub struct CommandChannel {
    purchase: PurchaseService,
    calendar: CalendarService,
    storage: ScopedFileStore,
    default_product_id: String,
    default_product_kind: ProductKind,
}

impl CommandChannel {
    /// Builds the services, starts the purchase connection and returns the notification stream.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage directory cannot be created.
    pub fn open(
        config: &BridgeConfig,
        services: BridgeServices,
    ) -> Result<(Self, NotificationStream), String> {
        let storage = ScopedFileStore::from_root(&services.storage_root)?;
        let (sender, stream) = mpsc::unbounded();
        let purchase = PurchaseService::start(
            services.purchase_backend,
            sender,
            config.external_timeout(),
        );
        let calendar = CalendarService::new(
            services.calendar_provider,
            services.permissions,
            config.external_timeout(),
            config.time_zone.clone().unwrap_or_else(local_time_zone_id),
            config.default_event_duration_ms(),
        );
        let channel = Self {
            purchase,
            calendar,
            storage,
            default_product_id: config.default_product_id.clone(),
            default_product_kind: config.default_product_kind,
        };
        Ok((channel, stream))
    }

    /// Dispatches a named command with an argument object.
    pub async fn dispatch(&self, name: &str, args: Payload) -> CommandResult {
        debug!(command = name, "dispatching bridge command");
        self.finish(name, BridgeCommand::parse(name, args)).await
    }

    /// Dispatches a named command with arbitrary JSON arguments (`null` means none).
    pub async fn dispatch_value(&self, name: &str, args: Value) -> CommandResult {
        debug!(command = name, "dispatching bridge command");
        self.finish(name, BridgeCommand::parse_value(name, args)).await
    }

    async fn finish(
        &self,
        name: &str,
        parsed: Result<BridgeCommand, BridgeError>,
    ) -> CommandResult {
        let result = match parsed {
            Ok(command) => self.execute(command).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            if err.is_caller_error() {
                debug!(command = name, error = %err, "bridge command rejected");
            } else {
                warn!(command = name, error = %err, "bridge command failed");
            }
        }
        result.into()
    }

    /// Runs a decoded command against its owning service.
    ///
    /// # Errors
    ///
    /// Returns the [`BridgeError`] that rejects the command.
    pub async fn execute(&self, command: BridgeCommand) -> Result<Value, BridgeError> {
        match command {
            BridgeCommand::BillingIsReady => Ok(json!({ "ready": self.purchase.is_ready() })),
            BridgeCommand::BillingQueryProduct(args) => {
                let product_id = args
                    .product_id
                    .unwrap_or_else(|| self.default_product_id.clone());
                let kind = args.product_kind.unwrap_or(self.default_product_kind);
                let report = self.purchase.query_product(&product_id, kind).await;
                Ok(Value::Object(report.to_payload()))
            }
            BridgeCommand::BillingPurchase(args) => {
                let product_id = args
                    .product_id
                    .unwrap_or_else(|| self.default_product_id.clone());
                let code = self.purchase.purchase(&product_id).await?;
                Ok(json!({ "code": code }))
            }
            BridgeCommand::BillingGetLastToken => {
                Ok(json!({ "token": self.purchase.last_token() }))
            }
            BridgeCommand::CalendarRequestPermissions => {
                Ok(json!({ "granted": self.calendar.request_permissions().await }))
            }
            BridgeCommand::CalendarAddEvents(args) => {
                let report = self.calendar.add_events(args.events.as_deref()).await;
                serde_json::to_value(report).map_err(|err| BridgeError::Backend(err.to_string()))
            }
            BridgeCommand::StorageSave(SaveArgs {
                name,
                content,
                json: legacy_content,
            }) => {
                let content = content.or(legacy_content).unwrap_or_default();
                Ok(match self.storage.save(&name.unwrap_or_default(), &content) {
                    Ok(name) => json!({ "ok": true, "name": name }),
                    Err(err) => storage_failure(err),
                })
            }
            BridgeCommand::StorageList => {
                let files = serde_json::to_value(self.storage.list())
                    .unwrap_or_else(|_| Value::Array(Vec::new()));
                Ok(json!({ "files": files }))
            }
            BridgeCommand::StorageRead(NameArgs { name }) => {
                Ok(match self.storage.read(&name.unwrap_or_default()) {
                    Ok(file) => json!({ "ok": true, "json": file.content, "name": file.name }),
                    Err(err) => storage_failure(err),
                })
            }
            BridgeCommand::StorageDelete(NameArgs { name }) => {
                Ok(match self.storage.delete(&name.unwrap_or_default()) {
                    Ok(outcome) => json!({ "ok": outcome.removed, "name": outcome.name }),
                    Err(err) => storage_failure(err),
                })
            }
        }
    }
}

fn storage_failure(err: StorageError) -> Value {
    json!({ "ok": false, "error": err.as_str() })
}
