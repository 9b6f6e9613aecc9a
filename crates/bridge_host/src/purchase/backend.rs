//! Purchase backend contracts plus no-op and in-memory adapters.

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard},
};

use super::types::{
    ProductDetails, ProductKind, ProductQueryOutcome, PurchaseFlowParams, PurchaseRecord,
    ResponseCode,
};

/// Object-safe boxed future used by [`PurchaseBackend`] async methods.
pub type PurchaseBackendFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Receiver for events the purchase backend raises on its own schedule.
///
/// Implementations must tolerate calls from any thread, including while a command is in flight.
pub trait PurchaseEventSink: Send + Sync {
    /// The connection handshake finished with `code`.
    fn setup_finished(&self, code: ResponseCode);

    /// The backend dropped the connection.
    fn disconnected(&self);

    /// One or more purchases completed or changed, in backend delivery order.
    fn purchases_updated(&self, code: ResponseCode, purchases: Vec<PurchaseRecord>);
}

/// External purchase SDK reached through the bridge.
pub trait PurchaseBackend: Send + Sync {
    /// Begins the connection handshake; results arrive through `sink`.
    fn start_connection(&self, sink: Arc<dyn PurchaseEventSink>);

    /// Looks up a single product of the given kind.
    fn query_product_details<'a>(
        &'a self,
        product_id: &'a str,
        kind: ProductKind,
    ) -> PurchaseBackendFuture<'a, ProductQueryOutcome>;

    /// Launches the purchase flow and returns its launch response code.
    fn launch_purchase_flow<'a>(
        &'a self,
        params: &'a PurchaseFlowParams,
    ) -> PurchaseBackendFuture<'a, ResponseCode>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Purchase backend for hosts without a store; the handshake never completes.
pub struct NoopPurchaseBackend;

impl PurchaseBackend for NoopPurchaseBackend {
    fn start_connection(&self, _sink: Arc<dyn PurchaseEventSink>) {}

    fn query_product_details<'a>(
        &'a self,
        _product_id: &'a str,
        _kind: ProductKind,
    ) -> PurchaseBackendFuture<'a, ProductQueryOutcome> {
        Box::pin(async {
            ProductQueryOutcome {
                code: ResponseCode::BILLING_UNAVAILABLE,
                products: Vec::new(),
            }
        })
    }

    fn launch_purchase_flow<'a>(
        &'a self,
        _params: &'a PurchaseFlowParams,
    ) -> PurchaseBackendFuture<'a, ResponseCode> {
        Box::pin(async { ResponseCode::BILLING_UNAVAILABLE })
    }
}

#[derive(Default)]
struct MemoryPurchaseState {
    catalog: Vec<ProductDetails>,
    query_code: ResponseCode,
    launch_code: ResponseCode,
    queries: Vec<(String, ProductKind)>,
    launches: Vec<PurchaseFlowParams>,
    sink: Option<Arc<dyn PurchaseEventSink>>,
}

#[derive(Clone, Default)]
/// Scriptable in-memory purchase backend.
///
/// The handshake stays pending until [`MemoryPurchaseBackend::finish_setup`] is called, and
/// purchase updates are injected with [`MemoryPurchaseBackend::deliver_purchases`].
pub struct MemoryPurchaseBackend {
    inner: Arc<Mutex<MemoryPurchaseState>>,
}

impl MemoryPurchaseBackend {
    fn state(&self) -> MutexGuard<'_, MemoryPurchaseState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn sink(&self) -> Option<Arc<dyn PurchaseEventSink>> {
        self.state().sink.clone()
    }

    /// Adds a product to the catalog served by lookups.
    pub fn with_product(self, details: ProductDetails) -> Self {
        self.state().catalog.push(details);
        self
    }

    /// Overrides the response code reported by lookups.
    pub fn set_query_code(&self, code: ResponseCode) {
        self.state().query_code = code;
    }

    /// Overrides the response code reported by purchase-flow launches.
    pub fn set_launch_code(&self, code: ResponseCode) {
        self.state().launch_code = code;
    }

    /// Returns every lookup received so far.
    pub fn queries(&self) -> Vec<(String, ProductKind)> {
        self.state().queries.clone()
    }

    /// Returns every purchase-flow launch received so far.
    pub fn launches(&self) -> Vec<PurchaseFlowParams> {
        self.state().launches.clone()
    }

    /// Returns whether a connection was started.
    pub fn is_connected(&self) -> bool {
        self.state().sink.is_some()
    }

    /// Completes the pending handshake with `code`.
    pub fn finish_setup(&self, code: ResponseCode) {
        if let Some(sink) = self.sink() {
            sink.setup_finished(code);
        }
    }

    /// Simulates the backend dropping the connection.
    pub fn disconnect(&self) {
        if let Some(sink) = self.sink() {
            sink.disconnected();
        }
    }

    /// Delivers a purchase-update batch.
    pub fn deliver_purchases(&self, code: ResponseCode, purchases: Vec<PurchaseRecord>) {
        if let Some(sink) = self.sink() {
            sink.purchases_updated(code, purchases);
        }
    }
}

impl PurchaseBackend for MemoryPurchaseBackend {
    fn start_connection(&self, sink: Arc<dyn PurchaseEventSink>) {
        self.state().sink = Some(sink);
    }

    fn query_product_details<'a>(
        &'a self,
        product_id: &'a str,
        kind: ProductKind,
    ) -> PurchaseBackendFuture<'a, ProductQueryOutcome> {
        Box::pin(async move {
            let mut state = self.state();
            state.queries.push((product_id.to_string(), kind));
            let products = state
                .catalog
                .iter()
                .filter(|details| details.product_id == product_id && details.kind == kind)
                .cloned()
                .collect();
            ProductQueryOutcome {
                code: state.query_code,
                products,
            }
        })
    }

    fn launch_purchase_flow<'a>(
        &'a self,
        params: &'a PurchaseFlowParams,
    ) -> PurchaseBackendFuture<'a, ResponseCode> {
        Box::pin(async move {
            let mut state = self.state();
            state.launches.push(params.clone());
            state.launch_code
        })
    }
}
