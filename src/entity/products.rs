use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub supplier_id: Uuid,
    pub sku: String,
    pub description: Option<String>,
    pub price: f64,
    pub weight: Option<f64>,
    pub dimensions: Option<Json>,
    pub sustainability_score: f64,
    pub carbon_footprint: f64,
    pub blockchain_hash: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Suppliers,
    #[sea_orm(has_many = "super::tracking_events::Entity")]
    TrackingEvents,
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl Related<super::tracking_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackingEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
