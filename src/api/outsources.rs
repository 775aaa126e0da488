use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::api::error_response;
use crate::models::outsource::OutsourceDto;
use crate::services::outsource_service;

pub async fn list_outsources(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match outsource_service::list_outsources(&db).await {
        Ok(outsources) => Json(json!({
            "success": true,
            "outsources": outsources,
            "total": outsources.len()
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_outsource(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<OutsourceDto>,
) -> impl IntoResponse {
    match outsource_service::create_outsource(&db, dto).await {
        Ok(outsource) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "outsource": outsource })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_outsource(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<OutsourceDto>,
) -> impl IntoResponse {
    match outsource_service::update_outsource(&db, id, dto).await {
        Ok(outsource) => Json(json!({ "success": true, "outsource": outsource })).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_outsource(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match outsource_service::delete_outsource(&db, id).await {
        Ok(()) => Json(json!({ "success": true, "message": "Outsource vendor deleted" }))
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/outsources/costs - per-vendor cost rollup for the management page
pub async fn vendor_costs(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match outsource_service::vendor_cost_rollup(&db).await {
        Ok(vendors) => Json(json!({ "success": true, "vendors": vendors })).into_response(),
        Err(e) => error_response(e),
    }
}
