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
use crate::models::sale::SaleDto;
use crate::services::sale_service::{self, SaleFilter};

/// Query parameters for listing sales
#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub delivery_start: Option<String>,
    pub delivery_end: Option<String>,
    pub customer_name: Option<String>,
    pub sale_type_id: Option<i32>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub status: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// GET /api/sales - list sales with filters, sorting and pagination
pub async fn list_sales(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ListSalesQuery>,
) -> impl IntoResponse {
    let filter = SaleFilter {
        start_date: params.start_date,
        end_date: params.end_date,
        delivery_start: params.delivery_start,
        delivery_end: params.delivery_end,
        customer_name: params.customer_name,
        sale_type_id: params.sale_type_id,
        min_amount: params.min_amount,
        max_amount: params.max_amount,
        status: params.status,
        sort_field: params.sort_field,
        sort_order: params.sort_order,
        page: params.page,
        per_page: params.per_page,
    };

    match sale_service::list_sales(&db, filter).await {
        Ok(page) => Json(json!({
            "success": true,
            "sales": page.sales,
            "page": page.page,
            "total_count": page.total_count,
            "total_pages": page.total_pages
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/sales/:id - one sale with its cost rows and derived figures
pub async fn get_sale(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match sale_service::get_sale(&db, id).await {
        Ok(sale) => Json(json!({ "success": true, "sale": sale })).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/sales - record a sale and its outsource cost together
pub async fn create_sale(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<SaleDto>,
) -> impl IntoResponse {
    match sale_service::create_sale(&db, dto).await {
        Ok(sale) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "sale": sale })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/sales/:id - update a sale and replace its outsource cost
pub async fn update_sale(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<SaleDto>,
) -> impl IntoResponse {
    match sale_service::update_sale(&db, id, dto).await {
        Ok(sale) => Json(json!({ "success": true, "sale": sale })).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/sales/:id - delete a sale and its dependents
pub async fn delete_sale(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match sale_service::delete_sale(&db, id).await {
        Ok(()) => Json(json!({ "success": true, "message": "Sale deleted" })).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/sales/:id/complete - mark a sale as completed
pub async fn complete_sale(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match sale_service::complete_sale(&db, id).await {
        Ok(sale) => Json(json!({ "success": true, "sale": sale })).into_response(),
        Err(e) => error_response(e),
    }
}
