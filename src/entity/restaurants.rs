use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cuisine_type: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub opening_time: Option<Time>,
    pub closing_time: Option<Time>,
    pub rating: f64,
    pub total_reviews: i32,
    pub delivery_fee: Option<Decimal>,
    pub estimated_delivery_time: Option<i32>,
    pub active: bool,
    pub approved: bool,
    pub owner_id: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::menu_items::Entity")]
    MenuItems,
}

impl Related<super::menu_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
