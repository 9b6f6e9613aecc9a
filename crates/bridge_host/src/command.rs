//! Bridge command surface: the tagged command union, results and notifications.
//!
//! Every command the front end may issue is a [`BridgeCommand`] variant, so handlers match
//! exhaustively and adding a command is a compile-checked change.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::calendar::types::EventRequest;
use crate::error::BridgeError;
use crate::purchase::types::ProductKind;

/// Structured argument or payload object.
pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Arguments of `Billing.queryProduct`.
pub struct QueryProductArgs {
    /// Product to look up; the configured default applies when absent.
    pub product_id: Option<String>,
    /// Product family; the configured default applies when absent.
    pub product_kind: Option<ProductKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Arguments of `Billing.purchase`.
pub struct PurchaseArgs {
    /// Product to purchase; the configured default applies when absent.
    pub product_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
/// Arguments of `Calendar.addEvents`.
pub struct AddEventsArgs {
    /// Batch items; `None` when the caller sent no list at all.
    #[serde(deserialize_with = "lenient_events")]
    pub events: Option<Vec<EventRequest>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
/// Arguments of `Storage.save`.
pub struct SaveArgs {
    /// Caller-supplied storage key.
    pub name: Option<String>,
    /// Content to store; takes precedence over `json` when both are sent.
    pub content: Option<String>,
    /// Legacy field name for the content.
    pub json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
/// Arguments of `Storage.read` and `Storage.delete`.
pub struct NameArgs {
    /// Caller-supplied storage key.
    pub name: Option<String>,
}

/// Decodes each batch item on its own so one malformed item cannot reject the batch.
fn lenient_events<'de, D>(deserializer: D) -> Result<Option<Vec<EventRequest>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw.map(|items| {
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Every command the bridge accepts.
pub enum BridgeCommand {
    /// `Billing.isReady`
    BillingIsReady,
    /// `Billing.queryProduct`
    BillingQueryProduct(QueryProductArgs),
    /// `Billing.purchase`
    BillingPurchase(PurchaseArgs),
    /// `Billing.getLastToken`
    BillingGetLastToken,
    /// `Calendar.requestPermissions`
    CalendarRequestPermissions,
    /// `Calendar.addEvents`
    CalendarAddEvents(AddEventsArgs),
    /// `Storage.save`
    StorageSave(SaveArgs),
    /// `Storage.list`
    StorageList,
    /// `Storage.read`
    StorageRead(NameArgs),
    /// `Storage.delete`
    StorageDelete(NameArgs),
}

impl BridgeCommand {
    /// Every accepted command name.
    pub const NAMES: [&'static str; 10] = [
        "Billing.isReady",
        "Billing.queryProduct",
        "Billing.purchase",
        "Billing.getLastToken",
        "Calendar.requestPermissions",
        "Calendar.addEvents",
        "Storage.save",
        "Storage.list",
        "Storage.read",
        "Storage.delete",
    ];

    /// Decodes a named command and its argument object.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownCommand`] for names outside [`Self::NAMES`] and
    /// [`BridgeError::InvalidArguments`] when the arguments do not decode.
    pub fn parse(name: &str, args: Payload) -> Result<Self, BridgeError> {
        let command = match name {
            "Billing.isReady" => Self::BillingIsReady,
            "Billing.queryProduct" => Self::BillingQueryProduct(decode_args(name, args)?),
            "Billing.purchase" => Self::BillingPurchase(decode_args(name, args)?),
            "Billing.getLastToken" => Self::BillingGetLastToken,
            "Calendar.requestPermissions" => Self::CalendarRequestPermissions,
            "Calendar.addEvents" => Self::CalendarAddEvents(decode_args(name, args)?),
            "Storage.save" => Self::StorageSave(decode_args(name, args)?),
            "Storage.list" => Self::StorageList,
            "Storage.read" => Self::StorageRead(decode_args(name, args)?),
            "Storage.delete" => Self::StorageDelete(decode_args(name, args)?),
            other => return Err(BridgeError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }

    /// Decodes a named command from an arbitrary JSON argument value.
    ///
    /// `null` is treated as an empty argument object.
    ///
    /// # Errors
    ///
    /// Same as [`Self::parse`]; non-object arguments are [`BridgeError::InvalidArguments`].
    pub fn parse_value(name: &str, args: Value) -> Result<Self, BridgeError> {
        match args {
            Value::Null => Self::parse(name, Payload::new()),
            Value::Object(map) => Self::parse(name, map),
            other if Self::NAMES.contains(&name) => Err(BridgeError::InvalidArguments {
                command: name.to_string(),
                message: format!("expected an argument object, got `{other}`"),
            }),
            _ => Err(BridgeError::UnknownCommand(name.to_string())),
        }
    }

    /// Returns the wire name of the command.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BillingIsReady => "Billing.isReady",
            Self::BillingQueryProduct(_) => "Billing.queryProduct",
            Self::BillingPurchase(_) => "Billing.purchase",
            Self::BillingGetLastToken => "Billing.getLastToken",
            Self::CalendarRequestPermissions => "Calendar.requestPermissions",
            Self::CalendarAddEvents(_) => "Calendar.addEvents",
            Self::StorageSave(_) => "Storage.save",
            Self::StorageList => "Storage.list",
            Self::StorageRead(_) => "Storage.read",
            Self::StorageDelete(_) => "Storage.delete",
        }
    }
}

fn decode_args<T: DeserializeOwned>(command: &str, args: Payload) -> Result<T, BridgeError> {
    serde_json::from_value(Value::Object(args)).map_err(|err| BridgeError::InvalidArguments {
        command: command.to_string(),
        message: err.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
/// Terminal result of one command invocation.
pub enum CommandResult {
    /// The command resolved with a payload.
    Success {
        /// Result object.
        payload: Payload,
    },
    /// The command was rejected.
    Failure {
        /// Failure message, prefixed with a stable code.
        message: String,
    },
}

impl CommandResult {
    /// Wraps a serializable result; non-object values are stored under `value`.
    pub fn success(value: Value) -> Self {
        let payload = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Payload::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self::Success { payload }
    }

    /// Builds a failure from a bridge error.
    pub fn failure(err: &BridgeError) -> Self {
        Self::Failure {
            message: err.to_string(),
        }
    }

    /// Returns whether the command resolved successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the success payload, if any.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// Converts into the resolve/reject pair used by webview IPC.
    ///
    /// # Errors
    ///
    /// Returns the failure message for rejected commands.
    pub fn into_result(self) -> Result<Value, String> {
        match self {
            Self::Success { payload } => Ok(Value::Object(payload)),
            Self::Failure { message } => Err(message),
        }
    }
}

impl From<Result<Value, BridgeError>> for CommandResult {
    fn from(result: Result<Value, BridgeError>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(err) => Self::failure(&err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Out-of-band event pushed to the front end, not tied to any single command.
pub struct Notification {
    /// Event topic.
    pub topic: String,
    /// Event payload.
    pub payload: Payload,
}

impl Notification {
    /// Creates a notification from a topic and payload.
    pub fn new(topic: impl Into<String>, payload: Payload) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}
