//! CORS policy.
//!
//! ブラウザ向けの保護であって認可ではない。token 検証と ownership check は
//! この層とは独立に必ず走る。
//!
//! Policy:
//! - development: どの origin も許可 (credentials 無し)
//! - production: Config の allowlist に載った origin だけ許可。allowlist が
//!   空なら何も許可しない (全許可に倒れるより安全)

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;

const PREFLIGHT_MAX_AGE: std::time::Duration = std::time::Duration::from_secs(600);

/// Router 全体に CORS を掛ける。wildcard origin と credentials は併用しない。
pub fn apply(router: Router, config: &Config) -> Router {
    let allow_origin = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        AllowOrigin::list(allowed)
    } else {
        AllowOrigin::any()
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(PREFLIGHT_MAX_AGE);

    router.layer(cors)
}
