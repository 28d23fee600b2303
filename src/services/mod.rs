pub mod admin_service;
pub mod auth_service;
pub mod delivery_service;
pub mod menu_service;
pub mod order_service;
pub mod payment_service;
pub mod restaurant_service;
pub mod user_service;
