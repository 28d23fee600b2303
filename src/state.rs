use std::sync::Arc;

use crate::{
    card::CardGateway,
    config::AppConfig,
    db::{DbPool, OrmConn},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: AppConfig,
    pub card_gateway: Arc<dyn CardGateway>,
}
