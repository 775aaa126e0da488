pub mod auth;
pub mod customers;
pub mod health;
pub mod outsources;
pub mod reports;
pub mod sale_types;
pub mod sales;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::domain::errors::DomainError;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::get_me))
        // Customers
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/:id",
            put(customers::update_customer).delete(customers::delete_customer),
        )
        // Sale types
        .route(
            "/sale-types",
            get(sale_types::list_sale_types).post(sale_types::create_sale_type),
        )
        .route(
            "/sale-types/:id",
            put(sale_types::update_sale_type).delete(sale_types::delete_sale_type),
        )
        // Outsource vendors
        .route(
            "/outsources",
            get(outsources::list_outsources).post(outsources::create_outsource),
        )
        .route("/outsources/costs", get(outsources::vendor_costs))
        .route(
            "/outsources/:id",
            put(outsources::update_outsource).delete(outsources::delete_outsource),
        )
        // Sales
        .route("/sales", get(sales::list_sales).post(sales::create_sale))
        .route(
            "/sales/:id",
            get(sales::get_sale)
                .put(sales::update_sale)
                .delete(sales::delete_sale),
        )
        .route("/sales/:id/complete", put(sales::complete_sale))
        // Reports
        .route("/reports/dashboard", get(reports::dashboard))
        .route("/reports/monthly", get(reports::monthly_report))
        .with_state(db)
}

/// Maps a service error to its HTTP response. Every handler funnels its
/// error arm through here so the status mapping stays in one place.
pub fn error_response(e: DomainError) -> Response {
    match e {
        DomainError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Not found"})),
        )
            .into_response(),
        DomainError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": msg})),
        )
            .into_response(),
        DomainError::Precondition(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"success": false, "error": msg})),
        )
            .into_response(),
        DomainError::ConfirmationRequired(count) => (
            StatusCode::CONFLICT,
            Json(json!({
                "success": false,
                "requires_confirmation": true,
                "dependent_sales": count,
                "error": format!(
                    "deleting this customer also deletes {} sale(s); retry with confirm=true",
                    count
                )
            })),
        )
            .into_response(),
        DomainError::Cascade {
            step,
            entity_id,
            message,
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": format!("delete failed at step '{}' for id {}: {}", step, entity_id, message)
            })),
        )
            .into_response(),
        DomainError::Database(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": format!("Database error: {}", msg)})),
        )
            .into_response(),
    }
}
