//! Resource API routes
//!
//! Everything except health, login, register and logout sits behind the
//! session gate. Tenant path segments and entity owners are checked against
//! the session tenant.

pub mod areas;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod orders;
pub mod reports;
pub mod tables;
pub mod tenants;

use axum::routing::{get, patch, post};
use axum::{Json, Router, middleware};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use tower_http::trace::TraceLayer;

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::auth::session_middleware;
use crate::live::session::handle_live_ws;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;
type Created<T> = Result<(StatusCode, Json<T>), AppError>;

pub fn router(state: AppState) -> Router {
    let login = Router::new()
        .route("/api/login", post(auth::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));

    let register = Router::new()
        .route("/api/register", post(auth::register))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    let protected = Router::new()
        .route("/api/user", get(auth::current_user))
        .route("/api/tenants/{tid}", get(tenants::get_tenant))
        .route("/api/tenants/{tid}/users", get(tenants::list_users))
        .route(
            "/api/tenants/{tid}/areas",
            get(areas::list_areas).post(areas::create_area),
        )
        .route(
            "/api/tenants/{tid}/tables",
            get(tables::list_tables).post(tables::create_table),
        )
        .route("/api/areas/{area_id}/tables", get(tables::list_area_tables))
        .route("/api/tables/{id}", patch(tables::update_table))
        .route(
            "/api/tenants/{tid}/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/tenants/{tid}/menu-items",
            get(catalog::list_menu_items).post(catalog::create_menu_item),
        )
        .route(
            "/api/categories/{cid}/menu-items",
            get(catalog::list_category_menu_items),
        )
        .route("/api/menu-items/{id}", patch(catalog::update_menu_item))
        .route(
            "/api/tenants/{tid}/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/api/tables/{table_id}/orders", get(orders::list_table_orders))
        .route("/api/orders/{id}", patch(orders::update_order))
        .route(
            "/api/orders/{order_id}/items",
            get(orders::list_order_items).post(orders::add_order_item),
        )
        .route("/api/order-items/{id}", patch(orders::update_order_item))
        .route("/api/tenants/{tid}/dashboard", get(reports::get_dashboard))
        .route("/api/tenants/{tid}/stats", get(reports::list_stats))
        .route("/ws", get(handle_live_ws))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/logout", post(auth::logout))
        .merge(login)
        .merge(register)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn internal(e: impl std::fmt::Display) -> AppError {
    tracing::error!("Resource query error: {e}");
    AppError::new(ErrorCode::DatabaseError)
}

fn created<T>(value: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

/// Reject blank names on create payloads
fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField)
            .with_detail("field", field.to_string()));
    }
    Ok(())
}
