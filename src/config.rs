use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub delivery_gateway_url: String,
    pub delivery_gateway_token: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            delivery_gateway_url: env::var("DELIVERY_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/v1/deliver".to_string()),
            delivery_gateway_token: env::var("DELIVERY_GATEWAY_TOKEN")
                .unwrap_or_else(|_| "test-token-1".to_string()),
        }
    }
}
