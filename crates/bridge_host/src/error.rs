//! Bridge-level error taxonomy surfaced as command failures.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Rejection reasons that terminate a command with a failure result.
///
/// Storage I/O problems and backend response codes are not represented here: those travel as
/// data inside an otherwise successful result.
pub enum BridgeError {
    /// The command name does not belong to any bridge command family.
    #[error("UnknownCommand: `{0}` is not a bridge command")]
    UnknownCommand(String),
    /// The argument payload could not be decoded for the named command.
    #[error("InvalidArguments: {command}: {message}")]
    InvalidArguments {
        /// Command whose arguments were rejected.
        command: String,
        /// Decoder message.
        message: String,
    },
    /// A purchase was requested for a product that is not the cached query result.
    #[error("ProductNotLoaded: call Billing.queryProduct for this product first")]
    ProductNotLoaded,
    /// An external service did not answer within the configured limit.
    #[error("Timeout: {operation} did not complete within {timeout_ms} ms")]
    Timeout {
        /// Stable operation label.
        operation: &'static str,
        /// Limit that elapsed.
        timeout_ms: u64,
    },
    /// An external service failed outright.
    #[error("Backend: {0}")]
    Backend(String),
}

impl BridgeError {
    /// Returns the stable failure code that prefixes the display message.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand(_) => "UnknownCommand",
            Self::InvalidArguments { .. } => "InvalidArguments",
            Self::ProductNotLoaded => "ProductNotLoaded",
            Self::Timeout { .. } => "Timeout",
            Self::Backend(_) => "Backend",
        }
    }

    /// Returns whether the error was caused by the caller rather than an external service.
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand(_) | Self::InvalidArguments { .. } | Self::ProductNotLoaded
        )
    }
}
