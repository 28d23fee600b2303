use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Restaurant;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub address: String,
    pub cuisine_type: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub delivery_fee: Option<Decimal>,
    pub estimated_delivery_time: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub cuisine_type: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub delivery_fee: Option<Decimal>,
    pub estimated_delivery_time: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRatingRequest {
    pub rating: f64,
    pub total_reviews: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantList {
    pub items: Vec<Restaurant>,
}
