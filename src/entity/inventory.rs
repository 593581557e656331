use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub store_location: String,
    pub quantity: i32,
    pub reserved_quantity: i32,
    pub reorder_point: i32,
    pub max_stock: i32,
    pub last_restocked: DateTimeWithTimeZone,
    pub batch_number: Option<String>,
    pub last_updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
