//! 全レスポンス共通のセキュリティヘッダ。
//!
//! Router レベルで一括適用する (handler 側では触らない)。既にヘッダが
//! 付いているレスポンスは上書きしない。

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

// (header, value). clickjacking / MIME sniffing / referrer 漏洩 /
// ブラウザ機能の既定無効化。
const HEADERS: [(&str, &str); 5] = [
    ("x-frame-options", "DENY"),
    ("content-security-policy", "frame-ancestors 'none'"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("permissions-policy", "camera=(), microphone=(), geolocation=()"),
];

pub fn apply(mut router: Router) -> Router {
    for (name, value) in HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    router
}
