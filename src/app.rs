/*
 * Responsibility
 * - Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (CORS/Bearer など)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    api::v1::handlers::health::health,
    config::Config,
    middleware,
    repos::item_repo::{ItemRepository, PgItemRepository},
    services::{auth::build_token_verifier, authz::AuthorizationGate},
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG があればそれを使う。
    // 例: RUST_LOG=info,item_tracker=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// panic は必ず tracing に流す。stderr は起動方法によっては見えない。
// development では即 abort して気付けるようにし、production では既定の
// hook (stderr 出力) に落としてサーバは走り続ける。
fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let state = build_state(&config, pool)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &Config, pool: sqlx::PgPool) -> Result<AppState> {
    // Process-level services: one repository, one verifier (holding the
    // trust anchor loaded from config), one gate reading through the
    // same repository.
    let repo: Arc<dyn ItemRepository> = Arc::new(PgItemRepository::new(pool));
    let verifier = build_token_verifier(config)?;
    let gate = Arc::new(AuthorizationGate::new(repo.clone()));

    Ok(AppState::new(repo, verifier, gate))
}

fn build_router(state: AppState, config: &Config) -> Router {
    // /health stays outside the authenticated scope.
    let v1 = api::v1::routes();
    let v1 = middleware::auth::access::apply(v1, state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}
