//! Category endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{Category, CategoryId, CategoryUpdate, NewCategory};
use serde::Deserialize;

use super::{ListQuery, require_text};
use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::{AppState, PosCache, PosStore};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// POST /v1/categories
#[tracing::instrument(skip_all)]
pub async fn create<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    body: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(req) = body?;
    require_text("name", &req.name)?;

    let category = state
        .categories
        .create_category(NewCategory::new(req.name))
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /v1/categories/{id}
#[tracing::instrument(skip_all)]
pub async fn get<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = id?;
    let category = state.categories.get_category(CategoryId::new(id)).await?;
    Ok(Json(category))
}

/// GET /v1/categories?skip=&limit=
#[tracing::instrument(skip_all)]
pub async fn list<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let Query(query) = query?;
    let categories = state
        .categories
        .list_categories(query.pagination()?)
        .await?;
    Ok(Json(categories))
}

/// PUT /v1/categories/{id}
#[tracing::instrument(skip_all)]
pub async fn update<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<CategoryUpdate>, JsonRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    let category = state
        .categories
        .update_category(CategoryId::new(id), update)
        .await?;
    Ok(Json(category))
}

/// DELETE /v1/categories/{id}
#[tracing::instrument(skip_all)]
pub async fn delete<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.categories.delete_category(CategoryId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
