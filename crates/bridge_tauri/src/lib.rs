//! Tauri webview shell for the trip bridge.
//!
//! The shell owns one [`CommandChannel`] per app session, exposes it to the webview through a
//! single `bridge_invoke` command and forwards purchase notifications as Tauri events named after
//! their topic.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod bridge;

use std::sync::Arc;

use bridge_host::{NoopCalendarProvider, NoopPermissionGate, NoopPurchaseBackend};
use bridge_services::{
    init_tracing, BridgeConfig, BridgeServices, CommandChannel, NotificationStream,
    BRIDGE_CONFIG_FILE,
};
use futures::StreamExt;
use tauri::{Emitter, Manager};
use tracing::{info, warn};

fn forward_notifications(app: tauri::AppHandle, mut stream: NotificationStream) {
    tauri::async_runtime::spawn(async move {
        while let Some(notification) = stream.next().await {
            if let Err(err) = app.emit(&notification.topic, notification.payload) {
                warn!(topic = %notification.topic, error = %err, "notification emit failed");
            }
        }
    });
}

/// Starts the Tauri bridge host process.
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let config_path = app.path().app_config_dir()?.join(BRIDGE_CONFIG_FILE);
            let config = BridgeConfig::load_or_default(&config_path)?;
            init_tracing(&config.log_filter);

            // Desktop builds have no purchase SDK or calendar store.
            let services = BridgeServices {
                purchase_backend: Arc::new(NoopPurchaseBackend),
                calendar_provider: Arc::new(NoopCalendarProvider),
                permissions: Arc::new(NoopPermissionGate),
                storage_root: app.path().app_data_dir()?.join(&config.storage_dir_name),
            };
            let (channel, stream) = CommandChannel::open(&config, services)?;
            info!(config = %config_path.display(), "bridge channel opened");

            app.manage(channel);
            forward_notifications(app.handle().clone(), stream);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![bridge::bridge_invoke])
        .run(tauri::generate_context!())
        .expect("bridge_tauri failed to run Tauri application");
}
