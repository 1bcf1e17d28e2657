//! Payment method endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{NewPayment, Payment, PaymentId, PaymentType, PaymentUpdate};
use serde::Deserialize;

use super::{ListQuery, require_text};
use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::{AppState, PosCache, PosStore};

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub logo: String,
}

/// POST /v1/payments
#[tracing::instrument(skip_all)]
pub async fn create<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    body: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let Json(req) = body?;
    require_text("name", &req.name)?;

    let payment = state
        .payments
        .create_payment(NewPayment {
            name: req.name,
            payment_type: req.payment_type,
            logo: req.logo,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /v1/payments/{id}
#[tracing::instrument(skip_all)]
pub async fn get<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Payment>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.payments.get_payment(PaymentId::new(id)).await?))
}

/// GET /v1/payments?skip=&limit=
#[tracing::instrument(skip_all)]
pub async fn list<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.payments.list_payments(query.pagination()?).await?))
}

/// PUT /v1/payments/{id}
#[tracing::instrument(skip_all)]
pub async fn update<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<PaymentUpdate>, JsonRejection>,
) -> Result<Json<Payment>, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    let payment = state
        .payments
        .update_payment(PaymentId::new(id), update)
        .await?;
    Ok(Json(payment))
}

/// DELETE /v1/payments/{id}
#[tracing::instrument(skip_all)]
pub async fn delete<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.payments.delete_payment(PaymentId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
