pub mod auth;
pub mod deliveries;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod restaurants;
pub mod users;
