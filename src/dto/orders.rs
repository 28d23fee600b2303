use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::OrderStatus,
    models::{Order, OrderItem},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub restaurant_id: i64,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
