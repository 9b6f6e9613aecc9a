//! Purchase data types shared between the purchase service and backend adapters.

use serde::{Deserialize, Serialize};

/// Notification topic used for purchase updates pushed to the front end.
pub const PURCHASE_NOTIFICATION_TOPIC: &str = "purchase";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// Product family understood by the purchase backend.
pub enum ProductKind {
    /// Recurring subscription with one or more pricing offers.
    #[default]
    #[serde(rename = "subs", alias = "subscription")]
    Subscription,
    /// One-time purchase with a single price.
    #[serde(rename = "inapp", alias = "one-time")]
    OneTime,
}

impl ProductKind {
    /// Returns the backend token for the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subscription => "subs",
            Self::OneTime => "inapp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
/// Integer response code reported by the purchase backend.
pub struct ResponseCode(pub i32);

impl ResponseCode {
    /// Request succeeded.
    pub const OK: Self = Self(0);
    /// The user dismissed the purchase flow.
    pub const USER_CANCELED: Self = Self(1);
    /// The backend service is temporarily unreachable.
    pub const SERVICE_UNAVAILABLE: Self = Self(2);
    /// Billing is not supported for this account or device.
    pub const BILLING_UNAVAILABLE: Self = Self(3);
    /// The requested product is not available for purchase.
    pub const ITEM_UNAVAILABLE: Self = Self(4);
    /// The request was malformed.
    pub const DEVELOPER_ERROR: Self = Self(5);
    /// Fatal backend error.
    pub const ERROR: Self = Self(6);
    /// The product is already owned.
    pub const ITEM_ALREADY_OWNED: Self = Self(7);
    /// The product is not owned.
    pub const ITEM_NOT_OWNED: Self = Self(8);
    /// Network failure between device and backend.
    pub const NETWORK_ERROR: Self = Self(12);
    /// The connection to the backend service was lost.
    pub const SERVICE_DISCONNECTED: Self = Self(-1);
    /// The feature is not supported on this device.
    pub const FEATURE_NOT_SUPPORTED: Self = Self(-2);
    /// The backend did not answer in time.
    pub const SERVICE_TIMEOUT: Self = Self(-3);

    /// Returns whether the code reports success.
    pub const fn is_ok(self) -> bool {
        self.0 == Self::OK.0
    }
}

impl std::fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One pricing phase of a subscription offer (intro or base price).
pub struct PricingPhase {
    /// Locale-formatted price string.
    pub formatted_price: String,
    /// ISO-8601 billing period such as `P1M`.
    pub billing_period: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Subscription pricing offer.
pub struct SubscriptionOffer {
    /// Opaque token selecting this offer in the purchase flow.
    pub offer_token: String,
    /// Ordered pricing phases.
    pub pricing_phases: Vec<PricingPhase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Raw product description as returned by the purchase backend.
pub struct ProductDetails {
    /// Store product identifier.
    pub product_id: String,
    /// Store-localized title.
    pub title: String,
    /// Product family.
    pub kind: ProductKind,
    /// Formatted price for one-time products.
    pub one_time_price: Option<String>,
    /// Ordered subscription offers; empty for one-time products.
    pub subscription_offers: Vec<SubscriptionOffer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Product snapshot cached by the purchase service after a successful query.
pub struct Product {
    /// Store product identifier.
    pub id: String,
    /// Store-localized title.
    pub title: String,
    /// Product family.
    pub kind: ProductKind,
    /// Price shown to the user, when the backend provided one.
    pub formatted_price: Option<String>,
    /// Offer token attached to the purchase flow, when the product has offers.
    pub offer_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Backend answer to a single-product lookup.
pub struct ProductQueryOutcome {
    /// Response code of the lookup.
    pub code: ResponseCode,
    /// Matching products in backend order; may be empty.
    pub products: Vec<ProductDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Parameters handed to the backend purchase flow.
pub struct PurchaseFlowParams {
    /// Product being purchased.
    pub product_id: String,
    /// Product family.
    pub kind: ProductKind,
    /// Selected offer, if the cached product carried one.
    pub offer_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Completed or changed purchase reported by the backend.
pub struct PurchaseRecord {
    /// Purchase token.
    pub token: String,
    /// Products covered by the purchase, in backend order.
    pub product_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Lifecycle of the purchase backend connection.
pub enum PurchaseConnectionState {
    /// No connection; initial and post-disconnect state.
    #[default]
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Handshake succeeded.
    Ready,
}
