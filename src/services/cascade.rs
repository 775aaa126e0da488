//! Cascade Delete Coordinator
//!
//! The store has no server-side referential actions the application can rely
//! on, so deleting an entity with dependents is an ordered sequence of
//! independent delete calls: dependents first, owner last. The sequence is
//! not a transaction. Each completed step is logged, and the first failure
//! aborts the remaining steps and reports which step failed for which id.
//! Every step is a delete-by-filter, so re-running a partially completed
//! cascade is safe.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::errors::DomainError;
use crate::models::customer::Entity as Customer;
use crate::models::outsource::Entity as Outsource;
use crate::models::outsource_cost::{self, Entity as OutsourceCost};
use crate::models::sale::{self, Entity as Sale};
use crate::models::sale_item::{self, Entity as SaleItem};
use crate::models::sale_type::{Entity as SaleType, UNCATEGORIZED_ID};

fn step_failed(step: &'static str, entity_id: i32, e: sea_orm::DbErr) -> DomainError {
    tracing::error!(step, entity_id, error = %e, "cascade step failed; halting");
    DomainError::Cascade {
        step,
        entity_id,
        message: e.to_string(),
    }
}

/// Deletes the dependents of a single sale: sale items first, then outsource
/// costs. Shared by the sale cascade and the per-sale cleanup loop of the
/// customer cascade.
async fn delete_sale_dependents(db: &DatabaseConnection, sale_id: i32) -> Result<(), DomainError> {
    SaleItem::delete_many()
        .filter(sale_item::Column::SaleId.eq(sale_id))
        .exec(db)
        .await
        .map_err(|e| step_failed("sale_items", sale_id, e))?;
    tracing::info!(sale_id, "deleted sale items");

    OutsourceCost::delete_many()
        .filter(outsource_cost::Column::SaleId.eq(sale_id))
        .exec(db)
        .await
        .map_err(|e| step_failed("outsource_costs", sale_id, e))?;
    tracing::info!(sale_id, "deleted outsource costs");

    Ok(())
}

/// Deletes a sale: sale items, then outsource costs, then the sale row.
pub async fn delete_sale(db: &DatabaseConnection, sale_id: i32) -> Result<(), DomainError> {
    Sale::find_by_id(sale_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    delete_sale_dependents(db, sale_id).await?;

    Sale::delete_by_id(sale_id)
        .exec(db)
        .await
        .map_err(|e| step_failed("sale", sale_id, e))?;
    tracing::info!(sale_id, "deleted sale");

    Ok(())
}

/// Deletes a customer. With dependent sales the caller must pass
/// `confirmed = true`; otherwise the count is reported back without any side
/// effect so the user can be asked first. On confirmation every dependent
/// sale has its items and costs removed, then the sales are bulk-deleted,
/// then the customer row itself.
pub async fn delete_customer(
    db: &DatabaseConnection,
    customer_id: i32,
    confirmed: bool,
) -> Result<(), DomainError> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let dependent_sales = Sale::find()
        .filter(sale::Column::CustomerId.eq(customer_id))
        .all(db)
        .await?;

    if !dependent_sales.is_empty() {
        if !confirmed {
            return Err(DomainError::ConfirmationRequired(
                dependent_sales.len() as u64
            ));
        }

        for s in &dependent_sales {
            delete_sale_dependents(db, s.id).await?;
        }

        Sale::delete_many()
            .filter(sale::Column::CustomerId.eq(customer_id))
            .exec(db)
            .await
            .map_err(|e| step_failed("sales", customer_id, e))?;
        tracing::info!(
            customer_id,
            count = dependent_sales.len(),
            "deleted dependent sales"
        );
    }

    Customer::delete_by_id(customer_id)
        .exec(db)
        .await
        .map_err(|e| step_failed("customer", customer_id, e))?;
    tracing::info!(customer_id, "deleted customer");

    Ok(())
}

/// Deletes an outsource vendor: its cost rows first, then the vendor row.
pub async fn delete_outsource(
    db: &DatabaseConnection,
    outsource_id: i32,
) -> Result<(), DomainError> {
    Outsource::find_by_id(outsource_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    OutsourceCost::delete_many()
        .filter(outsource_cost::Column::OutsourceId.eq(outsource_id))
        .exec(db)
        .await
        .map_err(|e| step_failed("outsource_costs", outsource_id, e))?;
    tracing::info!(outsource_id, "deleted vendor cost rows");

    Outsource::delete_by_id(outsource_id)
        .exec(db)
        .await
        .map_err(|e| step_failed("outsource", outsource_id, e))?;
    tracing::info!(outsource_id, "deleted outsource vendor");

    Ok(())
}

/// Deletes a sale type. The Uncategorized sentinel is refused before any
/// remote call. Sales referencing the deleted type are reassigned to the
/// sentinel first, so no sale is ever left pointing at a missing type.
pub async fn delete_sale_type(
    db: &DatabaseConnection,
    sale_type_id: i32,
) -> Result<(), DomainError> {
    if sale_type_id == UNCATEGORIZED_ID {
        return Err(DomainError::Precondition(
            "the Uncategorized sale type cannot be deleted".to_string(),
        ));
    }

    SaleType::find_by_id(sale_type_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    // The sentinel is seeded by the migrations; a missing row means the
    // database was tampered with and reassignment would corrupt sales.
    SaleType::find_by_id(UNCATEGORIZED_ID)
        .one(db)
        .await?
        .ok_or_else(|| {
            DomainError::Precondition(
                "the Uncategorized sale type is missing; cannot reassign sales".to_string(),
            )
        })?;

    Sale::update_many()
        .col_expr(
            sale::Column::SaleTypeId,
            sea_orm::sea_query::Expr::value(UNCATEGORIZED_ID),
        )
        .filter(sale::Column::SaleTypeId.eq(sale_type_id))
        .exec(db)
        .await
        .map_err(|e| step_failed("reassign_sales", sale_type_id, e))?;
    tracing::info!(sale_type_id, "reassigned sales to the Uncategorized type");

    SaleType::delete_by_id(sale_type_id)
        .exec(db)
        .await
        .map_err(|e| step_failed("sale_type", sale_type_id, e))?;
    tracing::info!(sale_type_id, "deleted sale type");

    Ok(())
}

/// Replaces the outsource cost row of a sale: existing rows are removed, then
/// the new one (if any) is inserted. Used by the sale create/update form
/// path, which submits the sale and its cost together.
pub async fn replace_outsource_cost(
    db: &DatabaseConnection,
    sale_id: i32,
    input: Option<&outsource_cost::OutsourceCostInput>,
) -> Result<(), DomainError> {
    OutsourceCost::delete_many()
        .filter(outsource_cost::Column::SaleId.eq(sale_id))
        .exec(db)
        .await
        .map_err(|e| step_failed("outsource_costs", sale_id, e))?;

    if let Some(input) = input {
        if input.amount > 0 {
            let row = outsource_cost::ActiveModel {
                sale_id: Set(sale_id),
                outsource_id: Set(input.outsource_id),
                amount: Set(input.amount),
                description: Set(input.description.clone()),
                created_at: Set(chrono::Utc::now().to_rfc3339()),
                ..Default::default()
            };
            use sea_orm::ActiveModelTrait;
            row.insert(db)
                .await
                .map_err(|e| step_failed("outsource_cost_insert", sale_id, e))?;
        }
    }

    Ok(())
}
