//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{
    Money, NewOrder, NewOrderProduct, Order, OrderId, OrderProduct, Payment, PaymentId, ProductId,
    UserId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ListQuery, require_amount, require_text};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::users::UserResponse;
use crate::state::{AppState, PosCache, PosStore};

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub payment_id: u64,
    pub customer_name: String,
    pub total_paid: Money,
    pub products: Vec<OrderProductRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderProductRequest {
    pub product_id: u64,
    pub quantity: u32,
}

impl CreateOrderRequest {
    /// Validates the request and attributes it to the signed-in user.
    fn into_new_order(self, user_id: UserId) -> Result<NewOrder, ApiError> {
        require_text("customer_name", &self.customer_name)?;
        require_amount("total_paid", self.total_paid)?;
        if self.products.is_empty() {
            return Err(ApiError::BadRequest(
                "an order needs at least one product".to_string(),
            ));
        }
        if let Some(line) = self.products.iter().find(|p| p.quantity == 0) {
            return Err(ApiError::BadRequest(format!(
                "quantity for product {} must be at least 1",
                line.product_id
            )));
        }

        Ok(NewOrder {
            user_id,
            payment_id: PaymentId::new(self.payment_id),
            customer_name: self.customer_name,
            total_paid: self.total_paid,
            products: self
                .products
                .into_iter()
                .map(|p| NewOrderProduct::new(ProductId::new(p.product_id), p.quantity))
                .collect(),
        })
    }
}

// -- Response types --

/// An order as exposed over HTTP. The cashier is shown without credentials.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: UserId,
    pub payment_id: PaymentId,
    pub customer_name: String,
    pub total_price: Money,
    pub total_paid: Money,
    pub total_return: Money,
    pub receipt_code: Uuid,
    pub products: Vec<OrderProduct>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            payment_id: order.payment_id,
            customer_name: order.customer_name,
            total_price: order.total_price,
            total_paid: order.total_paid,
            total_return: order.total_return,
            receipt_code: order.receipt_code,
            products: order.products,
            created_at: order.created_at,
            updated_at: order.updated_at,
            user: order.user.map(UserResponse::from),
            payment: order.payment,
        }
    }
}

// -- Handlers --

/// POST /v1/orders
#[tracing::instrument(skip_all, fields(user_id = %user.0.user_id))]
pub async fn create<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    user: AuthUser,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(req) = body?;
    let order = req.into_new_order(user.0.user_id)?;

    let order = state.orders.create_order(order).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /v1/orders/{id}
#[tracing::instrument(skip_all)]
pub async fn get<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Path(id) = id?;
    let order = state.orders.get_order(OrderId::new(id)).await?;
    Ok(Json(order.into()))
}

/// GET /v1/orders?skip=&limit=
#[tracing::instrument(skip_all)]
pub async fn list<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let Query(query) = query?;
    let orders = state.orders.list_orders(query.pagination()?).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}
