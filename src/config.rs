/*
 * Responsibility
 * - 環境変数からの設定読み込み (DATABASE_URL, CORS 許可、trust anchor など)
 * - 必須値の欠落・不正値は ConfigError にして起動を止める
 */
use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // The fixed RSA public key tokens are verified against. One anchor
    // per process, loaded here once, never rotated at runtime.
    pub trust_anchor_pem: String,
    pub auth_leeway_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

        let database_url = required("DATABASE_URL")?;

        let app_env = std::env::var("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .unwrap_or(AppEnv::Development);

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| split_csv(&raw))
            .unwrap_or_default();

        // 環境変数経由の PEM は改行が `\n` のリテラルで届くことがある
        let trust_anchor_pem = required("TRUST_ANCHOR_PEM")?.replace("\\n", "\n");

        let auth_leeway_seconds = match std::env::var("AUTH_LEEWAY_SECONDS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("AUTH_LEEWAY_SECONDS"))?,
            Err(_) => 60,
        };

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            trust_anchor_pem,
            auth_leeway_seconds,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
