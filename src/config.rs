use anyhow::Context;
use axum_extra::extract::cookie::Key;

/// Dev-only fallback; deployments must override SECRET_KEY.
const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub table_name: String,
    pub aws_region: String,
    pub dynamodb_endpoint: Option<String>,
    pub hostname: String,
    pub environment: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            secret_key: std::env::var("SECRET_KEY")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEV_SECRET_KEY.to_string()),
            table_name: std::env::var("DYNAMODB_TABLE")
                .unwrap_or_else(|_| "ecs-demo-table".to_string()),
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            dynamodb_endpoint: std::env::var("DYNAMODB_ENDPOINT").ok(),
            hostname: std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Signing key for the flash cookie, derived from SECRET_KEY.
    /// Cookie keys need 64 bytes of material; short secrets are cycled.
    pub fn signing_key(&self) -> Key {
        Key::from(&key_material(&self.secret_key))
    }
}

fn key_material(secret: &str) -> Vec<u8> {
    let bytes = if secret.is_empty() {
        DEV_SECRET_KEY.as_bytes()
    } else {
        secret.as_bytes()
    };
    let mut material = Vec::with_capacity(64);
    while material.len() < 64 {
        let take = (64 - material.len()).min(bytes.len());
        material.extend_from_slice(&bytes[..take]);
    }
    material
}
