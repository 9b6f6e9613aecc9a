//! Webview entry point for bridge commands.

use bridge_services::CommandChannel;
use serde_json::Value;

/// Dispatches one bridge command; resolves with its payload or rejects with its message.
#[tauri::command]
pub async fn bridge_invoke(
    channel: tauri::State<'_, CommandChannel>,
    command: String,
    args: Option<Value>,
) -> Result<Value, String> {
    channel
        .dispatch_value(&command, args.unwrap_or(Value::Null))
        .await
        .into_result()
}
