//! Product endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{CategoryId, Money, NewProduct, Product, ProductFilter, ProductId, ProductUpdate};
use serde::Deserialize;

use super::{pagination, require_amount, require_text};
use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::{AppState, PosCache, PosStore};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category_id: u64,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub stock: u32,
    pub price: Money,
}

/// `?skip=&limit=&q=&category_id=`
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    /// Case-insensitive name search.
    pub q: Option<String>,
    pub category_id: Option<u64>,
}

/// POST /v1/products
#[tracing::instrument(skip_all)]
pub async fn create<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(req) = body?;
    require_text("name", &req.name)?;
    require_amount("price", req.price)?;

    let product = state
        .products
        .create_product(NewProduct {
            category_id: CategoryId::new(req.category_id),
            name: req.name,
            image: req.image,
            stock: req.stock,
            price: req.price,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /v1/products/{id}
#[tracing::instrument(skip_all)]
pub async fn get<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.products.get_product(ProductId::new(id)).await?))
}

/// GET /v1/products
#[tracing::instrument(skip_all)]
pub async fn list<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(query) = query?;
    let page = pagination(query.skip, query.limit)?;
    let filter = ProductFilter {
        search: query.q.filter(|q| !q.trim().is_empty()),
        category_id: query.category_id.map(CategoryId::new),
    };

    Ok(Json(state.products.list_products(filter, page).await?))
}

/// PUT /v1/products/{id}
#[tracing::instrument(skip_all)]
pub async fn update<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    if let Some(price) = update.price {
        require_amount("price", price)?;
    }

    let product = state
        .products
        .update_product(ProductId::new(id), update)
        .await?;
    Ok(Json(product))
}

/// DELETE /v1/products/{id}
#[tracing::instrument(skip_all)]
pub async fn delete<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.products.delete_product(ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
