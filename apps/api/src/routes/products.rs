//! Inventory routes.
//!
//! Besides CRUD, two small endpoints feed the sale form's page-local
//! scripting: the in-stock product picker and the price lookup.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use motowash_core::validation::{validate_non_negative, validate_product_name};
use motowash_core::Product;
use motowash_db::ProductInput;

use crate::app::AppState;
use crate::error::ApiError;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/available", get(available_products))
        .route("/price", get(price_lookup))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub stock: i64,
    pub price_cents: i64,
    #[serde(default)]
    pub cost_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub stock: i64,
    pub price_cents: i64,
    pub cost_cents: i64,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            stock: p.stock,
            price_cents: p.price_cents,
            cost_cents: p.cost_cents,
        }
    }
}

/// The picker feed: name, units on hand and sale price, in-stock only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableProduct {
    pub name: String,
    pub stock: i64,
    pub price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub price_cents: i64,
}

fn validate(req: &ProductRequest) -> Result<ProductInput, ApiError> {
    validate_product_name(&req.name).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_non_negative("stock", req.stock).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_non_negative("price", req.price_cents)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    validate_non_negative("cost", req.cost_cents)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    Ok(ProductInput {
        name: req.name.clone(),
        stock: req.stock,
        price_cents: req.price_cents,
        cost_cents: req.cost_cents,
    })
}

async fn list_products(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

async fn create_product(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let input = validate(&req)?;
    let product = state.db.products().create(&input).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

async fn get_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("product", &id))?;
    Ok(Json(product.into()))
}

async fn update_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let input = validate(&req)?;
    let product = state.db.products().update(&id, &input).await?;
    Ok(Json(product.into()))
}

async fn delete_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.products().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/products/available - products with stock, for the sale form.
async fn available_products(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<AvailableProduct>>, ApiError> {
    let products = state.db.products().in_stock().await?;
    Ok(Json(
        products
            .into_iter()
            .map(|p| AvailableProduct {
                name: p.name,
                stock: p.stock,
                price_cents: p.price_cents,
            })
            .collect(),
    ))
}

/// GET /api/products/price?name=... - price by exact name, 0 when unknown.
async fn price_lookup(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, ApiError> {
    let price_cents = state.db.products().price_by_name(&query.name).await?;
    Ok(Json(PriceResponse { price_cents }))
}
