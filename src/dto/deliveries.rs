use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{domain::DeliveryStatus, models::Delivery};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeliveryRequest {
    pub order_id: i64,
    pub pickup_address: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_notes: Option<String>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDeliveryRequest {
    pub delivery_person_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeliveryStatusRequest {
    pub status: DeliveryStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEstimatedTimeRequest {
    pub estimated_delivery_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotesRequest {
    pub notes: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OptimalDeliveriesQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub max: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryList {
    pub items: Vec<Delivery>,
}
