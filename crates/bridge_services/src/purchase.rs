//! Purchase service: backend connection lifecycle, product cache and purchase updates.
//!
//! All mutable state (connection state, cached product, last token) belongs to one
//! [`PurchaseService`] and is only touched under its mutex. Backend callbacks arrive through the
//! [`PurchaseEventSink`] implementation and are republished as [`Notification`]s on the session
//! channel; nothing waits for them to be drained.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bridge_host::{
    BridgeError, Notification, Payload, Product, ProductDetails, ProductKind, ProductQueryOutcome,
    PurchaseBackend, PurchaseConnectionState, PurchaseEventSink, PurchaseFlowParams,
    PurchaseRecord, ResponseCode, PURCHASE_NOTIFICATION_TOPIC,
};
use futures::channel::mpsc::UnboundedSender;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::external::bounded;

/// Sending half of the session notification channel.
pub type NotificationSender = UnboundedSender<Notification>;

/// Builds the cached product snapshot from backend details.
///
/// Subscriptions take the offer token from the first offer and the price from that offer's
/// first pricing phase; later offers and phases are ignored. One-time products use their single
/// formatted price and carry no offer token.
pub fn product_from_details(details: &ProductDetails) -> Product {
    let (formatted_price, offer_token) = match details.kind {
        ProductKind::Subscription => match details.subscription_offers.first() {
            Some(offer) => (
                offer
                    .pricing_phases
                    .first()
                    .map(|phase| phase.formatted_price.clone()),
                Some(offer.offer_token.clone()),
            ),
            None => (None, None),
        },
        ProductKind::OneTime => (details.one_time_price.clone(), None),
    };
    Product {
        id: details.product_id.clone(),
        title: details.title.clone(),
        kind: details.kind,
        formatted_price,
        offer_token,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a product lookup.
pub struct ProductQueryReport {
    /// Backend response code.
    pub code: ResponseCode,
    /// The newly cached product, or `None` when the lookup matched nothing.
    pub product: Option<Product>,
}

impl ProductQueryReport {
    /// Renders the `{code, found, title?, price?}` result object.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("code".into(), Value::from(self.code.0));
        payload.insert("found".into(), Value::Bool(self.product.is_some()));
        if let Some(product) = &self.product {
            payload.insert("title".into(), Value::String(product.title.clone()));
            payload.insert(
                "price".into(),
                product
                    .formatted_price
                    .clone()
                    .map_or(Value::Null, Value::String),
            );
        }
        payload
    }
}

#[derive(Debug, Default)]
struct PurchaseState {
    connection: PurchaseConnectionState,
    cached_product: Option<Product>,
    last_token: Option<String>,
}

struct PurchaseShared {
    state: Mutex<PurchaseState>,
    notifications: NotificationSender,
}

impl PurchaseShared {
    fn state(&self) -> MutexGuard<'_, PurchaseState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PurchaseEventSink for PurchaseShared {
    fn setup_finished(&self, code: ResponseCode) {
        info!(%code, "purchase backend setup finished");
        let mut state = self.state();
        if code.is_ok() {
            if state.connection == PurchaseConnectionState::Connecting {
                state.connection = PurchaseConnectionState::Ready;
            }
        } else {
            state.connection = PurchaseConnectionState::Disconnected;
        }
    }

    fn disconnected(&self) {
        warn!("purchase backend disconnected");
        self.state().connection = PurchaseConnectionState::Disconnected;
    }

    fn purchases_updated(&self, code: ResponseCode, purchases: Vec<PurchaseRecord>) {
        info!(%code, count = purchases.len(), "purchases updated");
        for purchase in purchases {
            let mut payload = Payload::new();
            payload.insert("token".into(), Value::String(purchase.token.clone()));
            payload.insert(
                "productIds".into(),
                Value::Array(purchase.product_ids.into_iter().map(Value::String).collect()),
            );
            // Token store and publish happen under one lock.
            let mut state = self.state();
            state.last_token = Some(purchase.token);
            if self
                .notifications
                .unbounded_send(Notification::new(PURCHASE_NOTIFICATION_TOPIC, payload))
                .is_err()
            {
                debug!("notification receiver dropped; purchase update not delivered");
            }
        }
    }
}

/// Owner of the purchase backend connection and the cached product.
pub struct PurchaseService {
    backend: Arc<dyn PurchaseBackend>,
    shared: Arc<PurchaseShared>,
    timeout: Duration,
}

impl PurchaseService {
    /// Creates the service and starts the backend handshake.
    ///
    /// The service is `Connecting` on return and becomes ready when the backend reports a
    /// successful setup, which may never happen.
    pub fn start(
        backend: Arc<dyn PurchaseBackend>,
        notifications: NotificationSender,
        timeout: Duration,
    ) -> Self {
        let shared = Arc::new(PurchaseShared {
            state: Mutex::new(PurchaseState::default()),
            notifications,
        });
        shared.state().connection = PurchaseConnectionState::Connecting;
        debug!("starting purchase backend connection");
        backend.start_connection(shared.clone());
        Self {
            backend,
            shared,
            timeout,
        }
    }

    /// Returns whether the backend handshake has completed and the connection is live.
    pub fn is_ready(&self) -> bool {
        self.shared.state().connection == PurchaseConnectionState::Ready
    }

    /// Looks up one product and caches it on success.
    ///
    /// An empty lookup leaves the previous cache untouched. Backend failures, including a lookup
    /// that outlives the external-call limit, are reported through [`ProductQueryReport::code`].
    pub async fn query_product(&self, product_id: &str, kind: ProductKind) -> ProductQueryReport {
        let outcome = match bounded(
            "Billing.queryProduct",
            self.timeout,
            self.backend.query_product_details(product_id, kind),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => ProductQueryOutcome {
                code: ResponseCode::SERVICE_TIMEOUT,
                products: Vec::new(),
            },
        };
        let product = outcome.products.first().map(product_from_details);
        if let Some(product) = &product {
            self.shared.state().cached_product = Some(product.clone());
        } else {
            debug!(
                product_id,
                kind = kind.as_str(),
                code = %outcome.code,
                "product lookup returned no match"
            );
        }
        ProductQueryReport {
            code: outcome.code,
            product,
        }
    }

    /// Launches the purchase flow for the cached product.
    ///
    /// Resolves with the launch response code; the purchase itself completes later through the
    /// update path. A launch that outlives the external-call limit resolves with
    /// [`ResponseCode::SERVICE_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ProductNotLoaded`] without contacting the backend when no product
    /// is cached or the cached id differs.
    pub async fn purchase(&self, product_id: &str) -> Result<ResponseCode, BridgeError> {
        let params = {
            let state = self.shared.state();
            match &state.cached_product {
                Some(product) if product.id == product_id => PurchaseFlowParams {
                    product_id: product.id.clone(),
                    kind: product.kind,
                    offer_token: product.offer_token.clone(),
                },
                _ => return Err(BridgeError::ProductNotLoaded),
            }
        };
        let code = bounded(
            "Billing.purchase",
            self.timeout,
            self.backend.launch_purchase_flow(&params),
        )
        .await
        .unwrap_or(ResponseCode::SERVICE_TIMEOUT);
        info!(product_id, kind = params.kind.as_str(), %code, "purchase flow launched");
        Ok(code)
    }

    /// Returns the most recent purchase token, if any update was received.
    pub fn last_token(&self) -> Option<String> {
        self.shared.state().last_token.clone()
    }

    /// Returns the currently cached product.
    pub fn cached_product(&self) -> Option<Product> {
        self.shared.state().cached_product.clone()
    }
}
