//! User registration, login and account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{NewUser, User, UserId, UserRole, UserUpdate};
use serde::{Deserialize, Serialize};

use super::{ListQuery, require_text};
use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::{AppState, PosCache, PosStore};

const MIN_PASSWORD_LEN: usize = 8;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -- Response types --

/// A user as exposed over HTTP, without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    require_text("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ApiError::BadRequest(format!("invalid email: {email}"))),
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

// -- Handlers --

/// POST /v1/users
///
/// Open registration. New accounts always get the cashier role; admins
/// promote through `PUT /v1/users/{id}`.
#[tracing::instrument(skip_all)]
pub async fn register<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(req) = body?;
    require_text("name", &req.name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let user = state
        .users
        .register(NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
            role: UserRole::Cashier,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /v1/users/login
#[tracing::instrument(skip_all)]
pub async fn login<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;
    let token = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

/// GET /v1/users/{id}
#[tracing::instrument(skip_all)]
pub async fn get<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(id) = id?;
    let user = state.users.get_user(UserId::new(id)).await?;
    Ok(Json(user.into()))
}

/// GET /v1/users?skip=&limit=
#[tracing::instrument(skip_all)]
pub async fn list<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let Query(query) = query?;
    let users = state.users.list_users(query.pagination()?).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// PUT /v1/users/{id}
#[tracing::instrument(skip_all)]
pub async fn update<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    if let Some(ref email) = update.email {
        validate_email(email)?;
    }
    if let Some(ref password) = update.password {
        validate_password(password)?;
    }

    let user = state.users.update_user(UserId::new(id), update).await?;
    Ok(Json(user.into()))
}

/// DELETE /v1/users/{id}
#[tracing::instrument(skip_all)]
pub async fn delete<S: PosStore, C: PosCache>(
    State(state): State<Arc<AppState<S, C>>>,
    _admin: AdminUser,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.users.delete_user(UserId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
