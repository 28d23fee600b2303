use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::MenuItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub restaurant_id: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub preparation_time: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub preparation_time: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAvailabilityRequest {
    pub available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemList {
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<String>,
}
