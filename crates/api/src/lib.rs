//! HTTP API server for the point-of-sale system.
//!
//! Provides REST endpoints under `/v1` for users, payment methods,
//! categories, products and orders, guarded by bearer tokens, with
//! structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::HmacTokenService;
use config::Config;
use state::{AppState, PosCache, PosStore};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: PosStore, C: PosCache>(
    state: Arc<AppState<S, C>>,
    metrics_handle: PrometheusHandle,
    config: &Config,
) -> Router {
    use routes::{categories, orders, payments, products, users};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let v1 = Router::new()
        .route(
            "/users",
            post(users::register::<S, C>).get(users::list::<S, C>),
        )
        .route("/users/login", post(users::login::<S, C>))
        .route(
            "/users/{id}",
            get(users::get::<S, C>)
                .put(users::update::<S, C>)
                .delete(users::delete::<S, C>),
        )
        .route(
            "/payments",
            post(payments::create::<S, C>).get(payments::list::<S, C>),
        )
        .route(
            "/payments/{id}",
            get(payments::get::<S, C>)
                .put(payments::update::<S, C>)
                .delete(payments::delete::<S, C>),
        )
        .route(
            "/categories",
            post(categories::create::<S, C>).get(categories::list::<S, C>),
        )
        .route(
            "/categories/{id}",
            get(categories::get::<S, C>)
                .put(categories::update::<S, C>)
                .delete(categories::delete::<S, C>),
        )
        .route(
            "/products",
            post(products::create::<S, C>).get(products::list::<S, C>),
        )
        .route(
            "/products/{id}",
            get(products::get::<S, C>)
                .put(products::update::<S, C>)
                .delete(products::delete::<S, C>),
        )
        .route(
            "/orders",
            post(orders::create::<S, C>).get(orders::list::<S, C>),
        )
        .route("/orders/{id}", get(orders::get::<S, C>));

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/v1", v1)
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the application state on top of `store` and `cache`, signing
/// tokens with the configured secret.
pub fn create_default_state<S: PosStore, C: PosCache>(
    store: S,
    cache: C,
    config: &Config,
) -> Arc<AppState<S, C>> {
    let tokens = HmacTokenService::new(config.token_secret.as_bytes(), config.token_duration());
    Arc::new(AppState::new(store, cache, tokens))
}
