//! Sale Type Service - categories that classify sales
//!
//! One row, the Uncategorized sentinel, is seeded by the migrations and acts
//! as the default type for new sales and the fallback when a type is deleted.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::errors::DomainError;
use crate::models::sale_type::{self, Entity as SaleType, SaleTypeDto};
use crate::services::cascade;

pub async fn list_sale_types(db: &DatabaseConnection) -> Result<Vec<sale_type::Model>, DomainError> {
    let types = SaleType::find()
        .order_by_asc(sale_type::Column::Name)
        .all(db)
        .await?;
    Ok(types)
}

pub async fn create_sale_type(
    db: &DatabaseConnection,
    dto: SaleTypeDto,
) -> Result<sale_type::Model, DomainError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "sale type name is required".to_string(),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let new_type = sale_type::ActiveModel {
        name: Set(name),
        description: Set(dto
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_type.insert(db).await?)
}

pub async fn update_sale_type(
    db: &DatabaseConnection,
    id: i32,
    dto: SaleTypeDto,
) -> Result<sale_type::Model, DomainError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "sale type name is required".to_string(),
        ));
    }

    let existing = SaleType::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: sale_type::ActiveModel = existing.into();
    active.name = Set(name);
    active.description = Set(dto
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty()));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Delete a sale type, reassigning its sales to the Uncategorized sentinel.
/// Deleting the sentinel itself is refused.
pub async fn delete_sale_type(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    cascade::delete_sale_type(db, id).await
}
