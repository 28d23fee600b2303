use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod deliveries;
pub mod doc;
pub mod health;
pub mod menu;
pub mod orders;
pub mod params;
pub mod payments;
pub mod restaurants;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/restaurants", restaurants::router())
        .nest("/menu", menu::router())
        .nest("/orders", orders::router())
        .nest("/deliveries", deliveries::router())
        .nest("/payments", payments::router())
        .nest("/admin", admin::router())
}
