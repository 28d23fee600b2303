use sea_orm::entity::prelude::*;

use crate::domain::DeliveryStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deliveries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub order_id: i64,
    pub delivery_person_id: Option<i64>,
    pub status: DeliveryStatus,
    pub pickup_address: Option<String>,
    pub delivery_address: Option<String>,
    pub assigned_at: Option<DateTimeWithTimeZone>,
    pub picked_up_at: Option<DateTimeWithTimeZone>,
    pub delivered_at: Option<DateTimeWithTimeZone>,
    pub estimated_delivery_time: Option<DateTimeWithTimeZone>,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub delivery_notes: Option<String>,
    #[sea_orm(unique)]
    pub tracking_code: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
