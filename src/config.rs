use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub card_gateway_url: String,
    pub card_gateway_key: String,
    pub payment_expiry_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")?;
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24);
        let card_gateway_url = env::var("CARD_GATEWAY_URL")
            .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string());
        let card_gateway_key = env::var("CARD_GATEWAY_KEY").unwrap_or_default();
        let payment_expiry_minutes = env::var("PAYMENT_EXPIRY_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(30);
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours,
            card_gateway_url,
            card_gateway_key,
            payment_expiry_minutes,
        })
    }
}
