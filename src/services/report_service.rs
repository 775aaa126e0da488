//! Report Service - dashboard and monthly report figures
//!
//! Both reports follow the same shape: fetch the sale and cost rows scoped to
//! the period, map them into plain records and let the aggregation functions
//! derive every figure in memory. Stored dates are `YYYY-MM-DD` strings, so
//! a lexicographic range filter is an exact calendar range filter.

use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;

use crate::domain::aggregation::{
    self, BreakdownSlice, CostRecord, PeriodBucket, PeriodTotals, SaleRecord, SaleStatus,
};
use crate::domain::errors::DomainError;
use crate::models::customer::{self, Entity as Customer};
use crate::models::outsource::Entity as Outsource;
use crate::models::outsource_cost::{self, Entity as OutsourceCost};
use crate::models::sale::{self, Entity as Sale};
use crate::models::sale_type::Entity as SaleType;
use crate::services::sale_service::{self, SaleWithCosts};

/// The dashboard page: this month at a glance plus the running year.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub year: i32,
    pub month: u32,
    pub current_month: PeriodTotals,
    pub recent_sales: Vec<SaleWithCosts>,
    pub in_progress_sales: Vec<SaleWithCosts>,
    pub monthly_trend: Vec<PeriodBucket>,
}

/// A breakdown slice with its share of the period total.
#[derive(Debug, Serialize)]
pub struct RatioSlice {
    pub label: String,
    pub amount: i64,
    pub percentage: f64,
}

/// The monthly report page for one year/month.
#[derive(Debug, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub totals: PeriodTotals,
    pub cost_ratio: f64,
    pub profit_ratio: f64,
    pub daily: Vec<PeriodBucket>,
    pub by_sale_type: Vec<BreakdownSlice>,
    pub by_customer: Vec<BreakdownSlice>,
    pub by_outsource: Vec<RatioSlice>,
    pub yearly_trend: Vec<PeriodBucket>,
}

fn month_bounds(year: i32, month: u32) -> (String, String) {
    let last_day = aggregation::days_in_month(year, month);
    (
        format!("{:04}-{:02}-01", year, month),
        format!("{:04}-{:02}-{:02}", year, month, last_day),
    )
}

/// Fetches sales in an inclusive `YYYY-MM-DD` range and maps them into
/// [`SaleRecord`]s with customer and type names resolved.
async fn fetch_sale_records(
    db: &DatabaseConnection,
    start: &str,
    end: &str,
) -> Result<Vec<SaleRecord>, DomainError> {
    let sales = Sale::find()
        .filter(sale::Column::SaleDate.gte(start))
        .filter(sale::Column::SaleDate.lte(end))
        .all(db)
        .await?;

    if sales.is_empty() {
        return Ok(Vec::new());
    }

    let customer_ids: Vec<i32> = sales.iter().map(|s| s.customer_id).collect();
    let customer_names: HashMap<i32, String> = Customer::find()
        .filter(customer::Column::Id.is_in(customer_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let type_names: HashMap<i32, String> = SaleType::find()
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    Ok(sales
        .into_iter()
        .filter_map(|s| {
            let sale_date = aggregation::parse_date(&s.sale_date)?;
            Some(SaleRecord {
                id: s.id,
                sale_date,
                delivery_date: s.delivery_date.as_deref().and_then(aggregation::parse_date),
                total_amount: s.total_amount,
                status: SaleStatus::parse(&s.sale_status).unwrap_or(SaleStatus::Completed),
                customer_name: customer_names.get(&s.customer_id).cloned(),
                sale_type_name: type_names.get(&s.sale_type_id).cloned(),
            })
        })
        .collect())
}

/// Fetches the cost rows belonging to the given sales, with vendor names.
async fn fetch_cost_records(
    db: &DatabaseConnection,
    sales: &[SaleRecord],
) -> Result<Vec<CostRecord>, DomainError> {
    if sales.is_empty() {
        return Ok(Vec::new());
    }

    let sale_ids: Vec<i32> = sales.iter().map(|s| s.id).collect();
    let costs = OutsourceCost::find()
        .filter(outsource_cost::Column::SaleId.is_in(sale_ids))
        .all(db)
        .await?;

    let vendor_names: HashMap<i32, String> = Outsource::find()
        .all(db)
        .await?
        .into_iter()
        .map(|o| (o.id, o.name))
        .collect();

    Ok(costs
        .into_iter()
        .map(|c| CostRecord {
            sale_id: c.sale_id,
            outsource_name: vendor_names.get(&c.outsource_id).cloned(),
            amount: c.amount,
        })
        .collect())
}

const RECENT_SALES_LIMIT: u64 = 5;

/// Builds the dashboard for the current month and year.
pub async fn dashboard(db: &DatabaseConnection) -> Result<Dashboard, DomainError> {
    let today = Local::now().date_naive();
    dashboard_at(db, today).await
}

/// Dashboard for the month containing `today`. Split out so tests can pin
/// the clock.
pub async fn dashboard_at(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Dashboard, DomainError> {
    let year = today.year();
    let month = today.month();

    let (start, end) = month_bounds(year, month);
    let month_sales = fetch_sale_records(db, &start, &end).await?;
    let month_costs = fetch_cost_records(db, &month_sales).await?;
    let current_month =
        aggregation::period_totals(&month_sales, &aggregation::cost_totals_by_sale(&month_costs));

    let recent_models = Sale::find()
        .order_by_desc(sale::Column::SaleDate)
        .order_by_desc(sale::Column::Id)
        .limit(RECENT_SALES_LIMIT)
        .all(db)
        .await?;
    let recent_sales = sale_service::annotate_sales_at(db, recent_models, today).await?;

    let in_progress_models = Sale::find()
        .filter(sale::Column::SaleStatus.eq(SaleStatus::InProgress.as_str()))
        .order_by_asc(sale::Column::DeliveryDate)
        .all(db)
        .await?;
    let in_progress_sales = sale_service::annotate_sales_at(db, in_progress_models, today).await?;

    let (year_start, year_end) = (format!("{:04}-01-01", year), format!("{:04}-12-31", year));
    let year_sales = fetch_sale_records(db, &year_start, &year_end).await?;
    let year_costs = fetch_cost_records(db, &year_sales).await?;
    let monthly_trend = aggregation::monthly_buckets(
        &year_sales,
        &aggregation::cost_totals_by_sale(&year_costs),
        year,
    );

    Ok(Dashboard {
        year,
        month,
        current_month,
        recent_sales,
        in_progress_sales,
        monthly_trend,
    })
}

/// Builds the monthly report for the given year and month.
pub async fn monthly_report(
    db: &DatabaseConnection,
    year: i32,
    month: u32,
) -> Result<MonthlyReport, DomainError> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::Validation(format!(
            "invalid month {}",
            month
        )));
    }
    if !(1970..=9999).contains(&year) {
        return Err(DomainError::Validation(format!("invalid year {}", year)));
    }

    let (start, end) = month_bounds(year, month);
    let sales = fetch_sale_records(db, &start, &end).await?;
    let costs = fetch_cost_records(db, &sales).await?;
    let cost_by_sale = aggregation::cost_totals_by_sale(&costs);

    let totals = aggregation::period_totals(&sales, &cost_by_sale);
    let cost_ratio = aggregation::percentage(totals.total_outsource_cost, totals.total_sales);
    let profit_ratio = aggregation::percentage(totals.total_profit, totals.total_sales);

    let daily = aggregation::daily_buckets(&sales, &cost_by_sale, year, month);
    let by_sale_type = aggregation::breakdown_by_sale_type(&sales);
    let by_customer = aggregation::breakdown_by_customer(&sales);

    let by_outsource = aggregation::breakdown_by_outsource(&costs)
        .into_iter()
        .map(|slice| RatioSlice {
            percentage: aggregation::percentage(slice.amount, totals.total_outsource_cost),
            label: slice.label,
            amount: slice.amount,
        })
        .collect();

    let (year_start, year_end) = (format!("{:04}-01-01", year), format!("{:04}-12-31", year));
    let year_sales = fetch_sale_records(db, &year_start, &year_end).await?;
    let year_costs = fetch_cost_records(db, &year_sales).await?;
    let yearly_trend = aggregation::monthly_buckets(
        &year_sales,
        &aggregation::cost_totals_by_sale(&year_costs),
        year,
    );

    Ok(MonthlyReport {
        year,
        month,
        totals,
        cost_ratio,
        profit_ratio,
        daily,
        by_sale_type,
        by_customer,
        by_outsource,
        yearly_trend,
    })
}
