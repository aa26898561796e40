//! Order checkout and lifecycle endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::{CheckoutOrchestrator, OrderLifecycle, PaymentGateway};
use common::{CustomerId, OrderId};
use domain::{Cart, Order, OrderStatus, PaymentMethod};
use serde::{Deserialize, Serialize};
use store::{CartStore, InventoryStore, OrderStore, StoreError};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<C, I, O, G>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    pub orchestrator: CheckoutOrchestrator<C, I, O, G>,
    pub lifecycle: OrderLifecycle<O, I>,
    pub carts: C,
    pub inventory: I,
    pub orders: O,
}

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Accepts both the `customer` wire name and `customerId`.
    #[serde(default, alias = "customer")]
    pub customer_id: Option<String>,
    pub payment_method: String,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
    pub payment: PaymentResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: domain::PaymentStatus,
    pub transaction_id: String,
    pub paid_at: String,
}

pub(crate) fn order_to_response(order: &Order) -> OrderResponse {
    let payment = order.payment();
    OrderResponse {
        id: order.id().to_string(),
        customer_id: order.customer_id().to_string(),
        amount_cents: order.amount().cents(),
        status: order.status(),
        payment_method: order.payment_method(),
        created_at: order.created_at().to_rfc3339(),
        items: order
            .line_items()
            .iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.to_string(),
                name: item.name.clone(),
                unit_price_cents: item.unit_price.cents(),
                quantity: item.quantity,
                subtotal_cents: item.subtotal.cents(),
            })
            .collect(),
        payment: PaymentResponse {
            amount_cents: payment.amount.cents(),
            method: payment.method,
            status: payment.status,
            transaction_id: payment.transaction_id.to_string(),
            paid_at: payment.paid_at.to_rfc3339(),
        },
    }
}

// -- Handlers --

/// POST /orders — check out the submitted items as a new order.
///
/// Prices and the order amount are computed server side from the
/// inventory ledger; any monetary fields in the request are ignored.
#[tracing::instrument(skip(state, req))]
pub async fn create<C, I, O, G>(
    State(state): State<Arc<AppState<C, I, O, G>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    let customer_id = match req.customer_id {
        Some(ref id_str) => {
            let uuid = uuid::Uuid::parse_str(id_str)
                .map_err(|e| ApiError::BadRequest(format!("Invalid customerId: {e}")))?;
            CustomerId::from_uuid(uuid)
        }
        None => CustomerId::new(),
    };
    let method = PaymentMethod::from_str(&req.payment_method)?;

    let mut cart = Cart::new();
    for item in &req.items {
        if item.quantity == 0 {
            return Err(ApiError::BadRequest(format!(
                "Quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        let product_id = domain::ProductId::new(item.product_id.as_str());
        let product = state
            .inventory
            .get_product(&product_id)
            .await?
            .ok_or(StoreError::ProductNotFound(product_id))?;
        cart.add(&product, item.quantity);
    }

    let order = state
        .orchestrator
        .checkout_cart(customer_id, &cart, method)
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(order_to_response(&order)),
    ))
}

/// GET /orders — list all orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<C, I, O, G>(
    State(state): State<Arc<AppState<C, I, O, G>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    let orders = state.orders.list().await?;
    Ok(Json(orders.iter().map(order_to_response).collect()))
}

/// GET /orders/:id — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<C, I, O, G>(
    State(state): State<Arc<AppState<C, I, O, G>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .get(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;
    Ok(Json(order_to_response(&order)))
}

/// PUT /orders/:id — transition an order to a new status.
#[tracing::instrument(skip(state, req))]
pub async fn update<C, I, O, G>(
    State(state): State<Arc<AppState<C, I, O, G>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    let order_id = parse_order_id(&id)?;
    let target = OrderStatus::from_str(&req.status)?;

    let order = state.lifecycle.transition(order_id, target).await?;
    Ok(Json(order_to_response(&order)))
}

/// DELETE /orders/:id — remove an order and its records.
#[tracing::instrument(skip(state))]
pub async fn delete<C, I, O, G>(
    State(state): State<Arc<AppState<C, I, O, G>>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    let order_id = parse_order_id(&id)?;
    state.orders.delete(order_id).await?;
    Ok(Json(serde_json::json!({ "message": "Order removed" })))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
