use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::api::error_response;
use crate::models::sale_type::SaleTypeDto;
use crate::services::sale_type_service;

pub async fn list_sale_types(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match sale_type_service::list_sale_types(&db).await {
        Ok(types) => Json(json!({
            "success": true,
            "sale_types": types,
            "total": types.len()
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_sale_type(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<SaleTypeDto>,
) -> impl IntoResponse {
    match sale_type_service::create_sale_type(&db, dto).await {
        Ok(sale_type) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "sale_type": sale_type })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_sale_type(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<SaleTypeDto>,
) -> impl IntoResponse {
    match sale_type_service::update_sale_type(&db, id, dto).await {
        Ok(sale_type) => Json(json!({ "success": true, "sale_type": sale_type })).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_sale_type(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match sale_type_service::delete_sale_type(&db, id).await {
        Ok(()) => Json(json!({ "success": true, "message": "Sale type deleted" })).into_response(),
        Err(e) => error_response(e),
    }
}
