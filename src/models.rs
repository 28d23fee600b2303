use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DeliveryStatus, OrderStatus, PaymentMethod, PaymentStatus, Role};

/// Public view of a user account; the password hash never leaves the service.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cuisine_type: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub rating: f64,
    pub total_reviews: i32,
    pub delivery_fee: Option<Decimal>,
    pub estimated_delivery_time: Option<i32>,
    pub active: bool,
    pub approved: bool,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub restaurant_id: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub available: bool,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub preparation_time: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub delivery_id: Option<i64>,
    pub payment_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub special_requests: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Delivery {
    pub id: i64,
    pub order_id: i64,
    pub delivery_person_id: Option<i64>,
    pub status: DeliveryStatus,
    pub pickup_address: Option<String>,
    pub delivery_address: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub delivery_notes: Option<String>,
    pub tracking_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub gateway_response: Option<String>,
    pub failure_reason: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub customer_id: Option<i64>,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}
