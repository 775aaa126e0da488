use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::models::customer::CustomerDto;
use crate::services::customer_service;

pub async fn list_customers(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match customer_service::list_customers(&db).await {
        Ok(customers) => Json(json!({
            "success": true,
            "customers": customers,
            "total": customers.len()
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_customer(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<CustomerDto>,
) -> impl IntoResponse {
    match customer_service::create_customer(&db, dto).await {
        Ok(customer) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "customer": customer })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_customer(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<CustomerDto>,
) -> impl IntoResponse {
    match customer_service::update_customer(&db, id, dto).await {
        Ok(customer) => Json(json!({ "success": true, "customer": customer })).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteCustomerQuery {
    /// Must be `true` to delete a customer that still has sales.
    pub confirm: Option<bool>,
}

pub async fn delete_customer(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteCustomerQuery>,
) -> impl IntoResponse {
    let confirmed = params.confirm.unwrap_or(false);
    match customer_service::delete_customer(&db, id, confirmed).await {
        Ok(()) => Json(json!({ "success": true, "message": "Customer deleted" })).into_response(),
        Err(e) => error_response(e),
    }
}
