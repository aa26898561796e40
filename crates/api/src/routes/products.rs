//! Product catalog and restock endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::PaymentGateway;
use domain::{Money, Product, ProductId};
use serde::{Deserialize, Serialize};
use store::{CartStore, InventoryStore, OrderStore};

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
    pub category: String,
}

#[derive(Deserialize)]
pub struct RestockRequest {
    pub quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
    pub category: String,
}

#[derive(Serialize)]
pub struct RestockResponse {
    pub id: String,
    pub stock: u32,
}

fn product_to_response(product: &Product) -> ProductResponse {
    ProductResponse {
        id: product.id.to_string(),
        name: product.name.clone(),
        price_cents: product.price.cents(),
        stock: product.stock,
        category: product.category.clone(),
    }
}

/// GET /products — list the catalog.
#[tracing::instrument(skip(state))]
pub async fn list<C, I, O, G>(
    State(state): State<Arc<AppState<C, I, O, G>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    let products = state.inventory.list_products().await?;
    Ok(Json(products.iter().map(product_to_response).collect()))
}

/// POST /products — create or replace a catalog product.
#[tracing::instrument(skip(state, req))]
pub async fn create<C, I, O, G>(
    State(state): State<Arc<AppState<C, I, O, G>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(axum::http::StatusCode, Json<ProductResponse>), ApiError>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    if req.price_cents < 0 {
        return Err(ApiError::BadRequest(
            "Price must not be negative".to_string(),
        ));
    }
    if req.id.trim().is_empty() {
        return Err(ApiError::BadRequest("Product ID is required".to_string()));
    }

    let product = Product::new(
        req.id,
        req.name,
        Money::from_cents(req.price_cents),
        req.stock,
        req.category,
    );
    state.inventory.insert_product(product.clone()).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(product_to_response(&product)),
    ))
}

/// POST /products/:id/restock — add stock to a product.
#[tracing::instrument(skip(state, req))]
pub async fn restock<C, I, O, G>(
    State(state): State<Arc<AppState<C, I, O, G>>>,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> Result<Json<RestockResponse>, ApiError>
where
    C: CartStore,
    I: InventoryStore,
    O: OrderStore,
    G: PaymentGateway,
{
    let product_id = ProductId::new(id);
    let stock = state.inventory.restock(&product_id, req.quantity).await?;
    Ok(Json(RestockResponse {
        id: product_id.to_string(),
        stock,
    }))
}
