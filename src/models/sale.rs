use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_id: i32,
    /// Free-text assignee, not a foreign key.
    pub user_name: Option<String>,
    pub sale_date: String,
    pub delivery_date: Option<String>,
    pub total_amount: i64, // integer currency units (JPY)
    pub sale_status: String,
    pub sale_type_id: i32,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::sale_type::Entity",
        from = "Column::SaleTypeId",
        to = "super::sale_type::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SaleType,
    #[sea_orm(has_many = "super::outsource_cost::Entity")]
    OutsourceCost,
    #[sea_orm(has_many = "super::sale_item::Entity")]
    SaleItem,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::sale_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleType.def()
    }
}

impl Related<super::outsource_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutsourceCost.def()
    }
}

impl Related<super::sale_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Payload for creating or updating a sale through the single form submission
/// (sale fields plus the optional outsource cost that is replaced with it).
#[derive(Debug, Deserialize)]
pub struct SaleDto {
    pub customer_id: i32,
    pub user_name: Option<String>,
    pub sale_date: String,
    pub delivery_date: Option<String>,
    pub total_amount: i64,
    pub sale_status: Option<String>,
    pub sale_type_id: Option<i32>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub outsource_cost: Option<super::outsource_cost::OutsourceCostInput>,
}
