//! Outsource Service - vendors and their per-sale cost rollup

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::models::customer::{self, Entity as Customer};
use crate::models::outsource::{self, Entity as Outsource, OutsourceDto};
use crate::models::outsource_cost::{self, Entity as OutsourceCost};
use crate::models::sale::{self, Entity as Sale};

pub async fn list_outsources(db: &DatabaseConnection) -> Result<Vec<outsource::Model>, DomainError> {
    let outsources = Outsource::find()
        .order_by_asc(outsource::Column::Name)
        .all(db)
        .await?;
    Ok(outsources)
}

pub async fn create_outsource(
    db: &DatabaseConnection,
    dto: OutsourceDto,
) -> Result<outsource::Model, DomainError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "outsource vendor name is required".to_string(),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let new_outsource = outsource::ActiveModel {
        name: Set(name),
        email: Set(dto
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())),
        notes: Set(dto
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_outsource.insert(db).await?)
}

pub async fn update_outsource(
    db: &DatabaseConnection,
    id: i32,
    dto: OutsourceDto,
) -> Result<outsource::Model, DomainError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "outsource vendor name is required".to_string(),
        ));
    }

    let existing = Outsource::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: outsource::ActiveModel = existing.into();
    active.name = Set(name);
    active.email = Set(dto
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty()));
    active.notes = Set(dto
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty()));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Delete a vendor and its cost rows, costs first.
pub async fn delete_outsource(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    crate::services::cascade::delete_outsource(db, id).await
}

/// One cost row of a vendor's rollup, joined with its sale and customer.
#[derive(Debug, Clone, Serialize)]
pub struct VendorCostEntry {
    pub cost_id: i32,
    pub sale_id: i32,
    pub sale_date: String,
    pub customer_name: String,
    pub sale_total: i64,
    pub amount: i64,
    pub description: Option<String>,
}

/// Costs of one vendor across all sales.
#[derive(Debug, Clone, Serialize)]
pub struct VendorCosts {
    pub id: i32,
    pub name: String,
    pub total_cost: i64,
    pub entries: Vec<VendorCostEntry>,
}

/// Per-vendor cost rollup for the outsource management page: every cost row
/// (most recent first) grouped by vendor, with sale and customer context.
pub async fn vendor_cost_rollup(db: &DatabaseConnection) -> Result<Vec<VendorCosts>, DomainError> {
    let costs = OutsourceCost::find()
        .order_by_desc(outsource_cost::Column::CreatedAt)
        .all(db)
        .await?;

    if costs.is_empty() {
        return Ok(Vec::new());
    }

    let sale_ids: Vec<i32> = costs.iter().map(|c| c.sale_id).collect();
    let sales: HashMap<i32, sale::Model> = Sale::find()
        .filter(sale::Column::Id.is_in(sale_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let customer_ids: Vec<i32> = sales.values().map(|s| s.customer_id).collect();
    let customer_names: HashMap<i32, String> = Customer::find()
        .filter(customer::Column::Id.is_in(customer_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let vendors: HashMap<i32, String> = Outsource::find()
        .all(db)
        .await?
        .into_iter()
        .map(|o| (o.id, o.name))
        .collect();

    let mut rollup: Vec<VendorCosts> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();

    for cost in costs {
        let entry = match sales.get(&cost.sale_id) {
            Some(s) => VendorCostEntry {
                cost_id: cost.id,
                sale_id: s.id,
                sale_date: s.sale_date.clone(),
                customer_name: customer_names
                    .get(&s.customer_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                sale_total: s.total_amount,
                amount: cost.amount,
                description: cost.description.clone(),
            },
            // orphaned cost row (sale removed outside the cascade paths)
            None => VendorCostEntry {
                cost_id: cost.id,
                sale_id: cost.sale_id,
                sale_date: String::new(),
                customer_name: "Unknown".to_string(),
                sale_total: 0,
                amount: cost.amount,
                description: cost.description.clone(),
            },
        };

        let idx = *index.entry(cost.outsource_id).or_insert_with(|| {
            rollup.push(VendorCosts {
                id: cost.outsource_id,
                name: vendors
                    .get(&cost.outsource_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                total_cost: 0,
                entries: Vec::new(),
            });
            rollup.len() - 1
        });

        rollup[idx].total_cost += cost.amount;
        rollup[idx].entries.push(entry);
    }

    Ok(rollup)
}
