//! Customer Service - business logic for customer records

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::errors::DomainError;
use crate::models::customer::{self, CustomerDto, Entity as Customer};
use crate::services::cascade;

/// List all customers ordered by name.
pub async fn list_customers(db: &DatabaseConnection) -> Result<Vec<customer::Model>, DomainError> {
    let customers = Customer::find()
        .order_by_asc(customer::Column::Name)
        .all(db)
        .await?;
    Ok(customers)
}

/// Create a new customer. The name is required; surrounding whitespace is
/// trimmed before storage.
pub async fn create_customer(
    db: &DatabaseConnection,
    dto: CustomerDto,
) -> Result<customer::Model, DomainError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "customer name is required".to_string(),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let new_customer = customer::ActiveModel {
        name: Set(name),
        contact_person: Set(dto
            .contact_person
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_customer.insert(db).await?)
}

/// Update an existing customer.
pub async fn update_customer(
    db: &DatabaseConnection,
    id: i32,
    dto: CustomerDto,
) -> Result<customer::Model, DomainError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "customer name is required".to_string(),
        ));
    }

    let existing = Customer::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: customer::ActiveModel = existing.into();
    active.name = Set(name);
    active.contact_person = Set(dto
        .contact_person
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty()));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Delete a customer and, once confirmed, all of its sales and their
/// dependents. See [`cascade::delete_customer`] for the ordering.
pub async fn delete_customer(
    db: &DatabaseConnection,
    id: i32,
    confirmed: bool,
) -> Result<(), DomainError> {
    cascade::delete_customer(db, id, confirmed).await
}
