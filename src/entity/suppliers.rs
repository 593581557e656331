use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub blockchain_address: Option<String>,
    pub sustainability_score: f64,
    pub performance_rating: f64,
    pub on_time_delivery: f64,
    pub quality_score: f64,
    pub cost_efficiency: f64,
    pub verified: bool,
    pub certification_level: String,
    pub specialties: Json,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
