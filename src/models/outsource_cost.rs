use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outsource_costs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sale_id: i32,
    pub outsource_id: i32,
    pub amount: i64,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sale::Entity",
        from = "Column::SaleId",
        to = "super::sale::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Sale,
    #[sea_orm(
        belongs_to = "super::outsource::Entity",
        from = "Column::OutsourceId",
        to = "super::outsource::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Outsource,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl Related<super::outsource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Outsource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// The cost portion of the sale form. The write path keeps one row per sale
/// (delete existing rows, insert this one), see sale_service.
#[derive(Debug, Clone, Deserialize)]
pub struct OutsourceCostInput {
    pub outsource_id: i32,
    pub amount: i64,
    pub description: Option<String>,
}
