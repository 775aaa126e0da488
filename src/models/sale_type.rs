use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable id of the seeded "Uncategorized" sentinel row. Sales with no
/// explicit type reference it, and deleted types reassign their sales to it.
/// The row is created by the migrations and must never be deleted.
pub const UNCATEGORIZED_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale::Entity")]
    Sale,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Deserialize)]
pub struct SaleTypeDto {
    pub name: String,
    pub description: Option<String>,
}
