//! Gateway configuration — §6 "Environment".

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub adonis_endpoint: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8080);

        let adonis_endpoint = env::var("ADONIS_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self { port, adonis_endpoint }
    }
}
