use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, Local};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::services::report_service;

/// GET /api/reports/dashboard - current month at a glance
pub async fn dashboard(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match report_service::dashboard(&db).await {
        Ok(dashboard) => Json(json!({ "success": true, "dashboard": dashboard })).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/reports/monthly?year=&month= - report for one month, defaulting
/// to the current one
pub async fn monthly_report(
    State(db): State<DatabaseConnection>,
    Query(params): Query<MonthlyReportQuery>,
) -> impl IntoResponse {
    let today = Local::now().date_naive();
    let year = params.year.unwrap_or_else(|| today.year());
    let month = params.month.unwrap_or_else(|| today.month());

    match report_service::monthly_report(&db, year, month).await {
        Ok(report) => Json(json!({ "success": true, "report": report })).into_response(),
        Err(e) => error_response(e),
    }
}
