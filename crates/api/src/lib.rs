//! HTTP API server for the checkout and order fulfillment core.
//!
//! Exposes the product catalog, checkout, and order lifecycle over
//! REST, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use checkout::{CheckoutOrchestrator, InstantPaymentGateway, OrderLifecycle, PaymentGateway};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{
    CartStore, InMemoryCartStore, InMemoryInventoryStore, InMemoryOrderStore, InventoryStore,
    OrderStore,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, I, O, G>(
    state: Arc<AppState<C, I, O, G>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    C: CartStore + 'static,
    I: InventoryStore + 'static,
    O: OrderStore + 'static,
    G: PaymentGateway + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<C, I, O, G>))
        .route("/orders", get(routes::orders::list::<C, I, O, G>))
        .route("/orders/{id}", get(routes::orders::get::<C, I, O, G>))
        .route("/orders/{id}", put(routes::orders::update::<C, I, O, G>))
        .route("/orders/{id}", delete(routes::orders::delete::<C, I, O, G>))
        .route("/products", get(routes::products::list::<C, I, O, G>))
        .route("/products", post(routes::products::create::<C, I, O, G>))
        .route(
            "/products/{id}/restock",
            post(routes::products::restock::<C, I, O, G>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the in-memory backends.
pub fn create_default_state(
    config: &Config,
) -> Arc<
    AppState<InMemoryCartStore, InMemoryInventoryStore, InMemoryOrderStore, InstantPaymentGateway>,
> {
    let carts = InMemoryCartStore::new();
    let inventory = InMemoryInventoryStore::new();
    let orders = InMemoryOrderStore::new();
    let gateway = InstantPaymentGateway::new();

    let orchestrator = CheckoutOrchestrator::new(
        carts.clone(),
        inventory.clone(),
        orders.clone(),
        gateway.clone(),
    )
    .with_tax_percent(config.tax_percent)
    .with_store_timeout(config.store_timeout);
    let lifecycle = OrderLifecycle::new(orders.clone(), inventory.clone());

    Arc::new(AppState {
        orchestrator,
        lifecycle,
        carts,
        inventory,
        orders,
    })
}
