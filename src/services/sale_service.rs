//! Sale Service - business logic for sale transactions
//!
//! A sale and its outsource cost are submitted together through one form, so
//! the create/update paths upsert the sale and then replace its cost row.
//! List rows are annotated with the summed outsource cost, the derived
//! profit, and the overdue flag.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::domain::aggregation::{self, SaleStatus};
use crate::domain::errors::DomainError;
use crate::models::customer::{self, Entity as Customer};
use crate::models::outsource::Entity as Outsource;
use crate::models::outsource_cost::{self, Entity as OutsourceCost};
use crate::models::sale::{self, Entity as Sale, SaleDto};
use crate::models::sale_type::{Entity as SaleType, UNCATEGORIZED_ID};
use crate::services::cascade;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Filter, sort and pagination parameters for listing sales.
#[derive(Debug, Default, Clone)]
pub struct SaleFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub delivery_start: Option<String>,
    pub delivery_end: Option<String>,
    /// Case-insensitive substring match on the customer name.
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

/// One outsource cost row attached to a sale for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCost {
    pub outsource_id: i32,
    pub outsource_name: String,
    pub amount: i64,
    pub description: Option<String>,
}

/// A sale enriched with related names, cost totals and the overdue flag.
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithCosts {
    pub id: i32,
    pub customer_id: i32,
    pub customer_name: String,
    pub user_name: Option<String>,
    pub sale_date: String,
    pub delivery_date: Option<String>,
    pub total_amount: i64,
    pub sale_status: String,
    pub sale_type_id: i32,
    pub sale_type_name: String,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub outsource_costs: Vec<SaleCost>,
    pub outsource_cost_total: i64,
    pub profit: i64,
    pub overdue: bool,
}

/// One page of annotated sales plus the exact total row count.
#[derive(Debug, Serialize)]
pub struct SalePage {
    pub sales: Vec<SaleWithCosts>,
    pub page: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

fn validate(dto: &SaleDto) -> Result<(), DomainError> {
    if dto.sale_date.trim().is_empty() {
        return Err(DomainError::Validation("sale date is required".to_string()));
    }
    if aggregation::parse_date(&dto.sale_date).is_none() {
        return Err(DomainError::Validation(format!(
            "invalid sale date '{}'",
            dto.sale_date
        )));
    }
    if let Some(delivery) = dto.delivery_date.as_deref().filter(|d| !d.is_empty()) {
        if aggregation::parse_date(delivery).is_none() {
            return Err(DomainError::Validation(format!(
                "invalid delivery date '{}'",
                delivery
            )));
        }
    }
    if dto.total_amount < 0 {
        return Err(DomainError::Validation(
            "total amount must not be negative".to_string(),
        ));
    }
    if let Some(status) = dto.sale_status.as_deref() {
        if SaleStatus::parse(status).is_none() {
            return Err(DomainError::Validation(format!(
                "unknown sale status '{}'",
                status
            )));
        }
    }
    if let Some(cost) = &dto.outsource_cost {
        if cost.amount < 0 {
            return Err(DomainError::Validation(
                "outsource cost must not be negative".to_string(),
            ));
        }
    }
    Ok(())
}

fn sort_column(field: &str) -> sale::Column {
    match field {
        "delivery_date" => sale::Column::DeliveryDate,
        "total_amount" => sale::Column::TotalAmount,
        "sale_status" => sale::Column::SaleStatus,
        "id" => sale::Column::Id,
        _ => sale::Column::SaleDate,
    }
}

/// Annotates against the wall clock. The report paths pass their own `today`
/// so a whole report is evaluated against one clock.
async fn annotate_sales(
    db: &DatabaseConnection,
    sales: Vec<sale::Model>,
) -> Result<Vec<SaleWithCosts>, DomainError> {
    annotate_sales_at(db, sales, Local::now().date_naive()).await
}

/// Annotates sale models with customer/type names, cost rows and totals.
/// Performs one in-list fetch per related table, like the report paths.
/// Overdue flags are evaluated against `today`.
pub(crate) async fn annotate_sales_at(
    db: &DatabaseConnection,
    sales: Vec<sale::Model>,
    today: NaiveDate,
) -> Result<Vec<SaleWithCosts>, DomainError> {
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

    let sale_ids: Vec<i32> = sales.iter().map(|s| s.id).collect();
    let cost_rows = OutsourceCost::find()
        .filter(outsource_cost::Column::SaleId.is_in(sale_ids))
        .all(db)
        .await?;

    let vendor_names: HashMap<i32, String> = Outsource::find()
        .all(db)
        .await?
        .into_iter()
        .map(|o| (o.id, o.name))
        .collect();

    let mut costs_by_sale: HashMap<i32, Vec<SaleCost>> = HashMap::new();
    for row in &cost_rows {
        costs_by_sale
            .entry(row.sale_id)
            .or_default()
            .push(SaleCost {
                outsource_id: row.outsource_id,
                outsource_name: vendor_names
                    .get(&row.outsource_id)
                    .cloned()
                    .unwrap_or_else(|| aggregation::UNKNOWN_LABEL.to_string()),
                amount: row.amount,
                description: row.description.clone(),
            });
    }

    let cost_records: Vec<aggregation::CostRecord> = cost_rows
        .iter()
        .map(|row| aggregation::CostRecord {
            sale_id: row.sale_id,
            outsource_name: None,
            amount: row.amount,
        })
        .collect();
    let cost_totals = aggregation::cost_totals_by_sale(&cost_records);

    Ok(sales
        .into_iter()
        .map(|s| {
            let (outsource_cost_total, profit) =
                aggregation::annotate(s.id, s.total_amount, &cost_totals);
            let status = SaleStatus::parse(&s.sale_status).unwrap_or(SaleStatus::Completed);
            let overdue = aggregation::is_overdue(
                status,
                s.delivery_date.as_deref().and_then(aggregation::parse_date),
                today,
            );

            SaleWithCosts {
                customer_name: customer_names
                    .get(&s.customer_id)
                    .cloned()
                    .unwrap_or_else(|| aggregation::UNKNOWN_LABEL.to_string()),
                sale_type_name: type_names
                    .get(&s.sale_type_id)
                    .cloned()
                    .unwrap_or_else(|| aggregation::UNCATEGORIZED_LABEL.to_string()),
                outsource_costs: costs_by_sale.remove(&s.id).unwrap_or_default(),
                outsource_cost_total,
                profit,
                overdue,
                id: s.id,
                customer_id: s.customer_id,
                user_name: s.user_name,
                sale_date: s.sale_date,
                delivery_date: s.delivery_date,
                total_amount: s.total_amount,
                sale_status: s.sale_status,
                sale_type_id: s.sale_type_id,
                source: s.source,
                notes: s.notes,
            }
        })
        .collect())
}

/// List sales with filters, sorting and pagination.
pub async fn list_sales(db: &DatabaseConnection, filter: SaleFilter) -> Result<SalePage, DomainError> {
    let page = filter.page.unwrap_or(1).max(1);
    let per_page = filter.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let mut query = Sale::find();

    if let Some(start) = filter.start_date.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(sale::Column::SaleDate.gte(start));
    }
    if let Some(end) = filter.end_date.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(sale::Column::SaleDate.lte(end));
    }
    if let Some(start) = filter.delivery_start.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(sale::Column::DeliveryDate.gte(start));
    }
    if let Some(end) = filter.delivery_end.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(sale::Column::DeliveryDate.lte(end));
    }
    if let Some(type_id) = filter.sale_type_id {
        query = query.filter(sale::Column::SaleTypeId.eq(type_id));
    }
    if let Some(min) = filter.min_amount {
        query = query.filter(sale::Column::TotalAmount.gte(min));
    }
    if let Some(max) = filter.max_amount {
        query = query.filter(sale::Column::TotalAmount.lte(max));
    }
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(sale::Column::SaleStatus.eq(status));
    }

    if let Some(name) = filter.customer_name.as_deref().filter(|s| !s.is_empty()) {
        // resolve matching customers first, then filter by their ids
        let matches = Customer::find()
            .filter(customer::Column::Name.contains(name))
            .all(db)
            .await?;
        if matches.is_empty() {
            return Ok(SalePage {
                sales: Vec::new(),
                page,
                total_count: 0,
                total_pages: 0,
            });
        }
        let ids: Vec<i32> = matches.into_iter().map(|c| c.id).collect();
        query = query.filter(sale::Column::CustomerId.is_in(ids));
    }

    let column = sort_column(filter.sort_field.as_deref().unwrap_or("sale_date"));
    query = match filter.sort_order.as_deref() {
        Some("asc") => query.order_by_asc(column),
        _ => query.order_by_desc(column),
    };

    let paginator = query.paginate(db, per_page);
    let total_count = paginator.num_items().await?;
    let total_pages = paginator.num_pages().await?;
    let models = paginator.fetch_page(page - 1).await?;

    Ok(SalePage {
        sales: annotate_sales(db, models).await?,
        page,
        total_count,
        total_pages,
    })
}

/// Fetch one sale with its cost rows and derived figures.
pub async fn get_sale(db: &DatabaseConnection, id: i32) -> Result<SaleWithCosts, DomainError> {
    let model = Sale::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut annotated = annotate_sales(db, vec![model]).await?;
    Ok(annotated.remove(0))
}

/// Create a sale and its outsource cost from one form submission.
pub async fn create_sale(db: &DatabaseConnection, dto: SaleDto) -> Result<sale::Model, DomainError> {
    validate(&dto)?;

    Customer::find_by_id(dto.customer_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::Validation("customer does not exist".to_string()))?;

    let now = chrono::Utc::now().to_rfc3339();
    let new_sale = sale::ActiveModel {
        customer_id: Set(dto.customer_id),
        user_name: Set(dto.user_name.clone()),
        sale_date: Set(dto.sale_date.clone()),
        delivery_date: Set(dto.delivery_date.clone().filter(|d| !d.is_empty())),
        total_amount: Set(dto.total_amount),
        sale_status: Set(dto
            .sale_status
            .clone()
            .unwrap_or_else(|| SaleStatus::Completed.as_str().to_string())),
        sale_type_id: Set(dto.sale_type_id.unwrap_or(UNCATEGORIZED_ID)),
        source: Set(dto.source.clone()),
        notes: Set(dto.notes.clone()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_sale.insert(db).await?;
    cascade::replace_outsource_cost(db, saved.id, dto.outsource_cost.as_ref()).await?;

    Ok(saved)
}

/// Update a sale and replace its outsource cost row.
pub async fn update_sale(
    db: &DatabaseConnection,
    id: i32,
    dto: SaleDto,
) -> Result<sale::Model, DomainError> {
    validate(&dto)?;

    let existing = Sale::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    Customer::find_by_id(dto.customer_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::Validation("customer does not exist".to_string()))?;

    let mut active: sale::ActiveModel = existing.into();
    active.customer_id = Set(dto.customer_id);
    active.user_name = Set(dto.user_name.clone());
    active.sale_date = Set(dto.sale_date.clone());
    active.delivery_date = Set(dto.delivery_date.clone().filter(|d| !d.is_empty()));
    active.total_amount = Set(dto.total_amount);
    if let Some(status) = dto.sale_status.clone() {
        active.sale_status = Set(status);
    }
    active.sale_type_id = Set(dto.sale_type_id.unwrap_or(UNCATEGORIZED_ID));
    active.source = Set(dto.source.clone());
    active.notes = Set(dto.notes.clone());
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let updated = active.update(db).await?;
    cascade::replace_outsource_cost(db, updated.id, dto.outsource_cost.as_ref()).await?;

    Ok(updated)
}

/// Delete a sale and its dependents in order. See [`cascade::delete_sale`].
pub async fn delete_sale(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    cascade::delete_sale(db, id).await
}

/// Mark a sale as completed (the progress-board shortcut).
pub async fn complete_sale(db: &DatabaseConnection, id: i32) -> Result<sale::Model, DomainError> {
    let existing = Sale::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: sale::ActiveModel = existing.into();
    active.sale_status = Set(SaleStatus::Completed.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}
