/*
 * Responsibility
 * - Bearer トークンの検証 (ヘッダ抽出 → 検証 → 拒否)
 * - 成功時に、認証済み主体 (AuthCtx) を request extensions に載せる
 * - 認可 (ownership) は handler 側で AuthorizationGate を使う
 */
//! access token (JWT) 検証 → AuthCtx を extensions に入れる
//!
//! 失敗理由は typed (`VerifyError`) でログには残すが、レスポンスは一律 401。
//! どの段階で落ちたかをクライアントに見せない。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// `/api/v1/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let credential = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    // extract → decode → verify は verifier 側で一本のパイプラインになっている
    let identity = match state.verifier.authenticate(credential) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(
                error = ?err,
                "bearer token verification failed"
            );
            return Err(AppError::Unauthorized);
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(identity));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{http::StatusCode, routing::get};
    use chrono::Utc;
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::repos::error::RepoError;
    use crate::repos::item_repo::{ItemChanges, ItemRepository, ItemRow, NewItem};
    use crate::services::auth::test_keys::{ANCHOR_PRIVATE_KEY_PEM, ANCHOR_PUBLIC_KEY_PEM};
    use crate::services::auth::verifier::Claims;
    use crate::services::auth::{PinnedKey, TokenVerifier};
    use crate::services::authz::AuthorizationGate;

    /// Any repository access during an unauthenticated request is a bug.
    struct UntouchableRepo;

    #[async_trait]
    impl ItemRepository for UntouchableRepo {
        async fn find_by_id(&self, _item_id: Uuid) -> Result<Option<ItemRow>, RepoError> {
            unreachable!("repository touched before authentication finished")
        }

        async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<ItemRow>, RepoError> {
            unreachable!("repository touched before authentication finished")
        }

        async fn insert(&self, _item: NewItem) -> Result<ItemRow, RepoError> {
            unreachable!("repository touched before authentication finished")
        }

        async fn update(
            &self,
            _item_id: Uuid,
            _changes: ItemChanges,
        ) -> Result<Option<ItemRow>, RepoError> {
            unreachable!("repository touched before authentication finished")
        }

        async fn delete(&self, _item_id: Uuid) -> Result<bool, RepoError> {
            unreachable!("repository touched before authentication finished")
        }
    }

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
        ctx.user_id().to_string()
    }

    fn app() -> Router {
        let repo: Arc<dyn ItemRepository> = Arc::new(UntouchableRepo);
        let anchor = PinnedKey::from_pem(ANCHOR_PUBLIC_KEY_PEM).expect("test anchor pem");
        let verifier = Arc::new(TokenVerifier::new(Arc::new(anchor), 0));
        let gate = Arc::new(AuthorizationGate::new(repo.clone()));
        let state = AppState::new(repo, verifier, gate);

        let router = Router::new().route("/whoami", get(whoami));
        apply(router, state.clone()).with_state(state)
    }

    fn bearer_for(sub: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            iat: now,
            exp: now + 600,
        };
        let key = EncodingKey::from_rsa_pem(ANCHOR_PRIVATE_KEY_PEM.as_bytes())
            .expect("test signing pem");
        let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .expect("sign token");

        format!("Bearer {token}")
    }

    fn get_request(credential: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(credential) = credential {
            builder = builder.header(header::AUTHORIZATION, credential);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn missing_credential_is_rejected_without_repository_access() {
        let res = app().oneshot(get_request(None)).await.expect("response");

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_scheme_is_rejected_without_repository_access() {
        let res = app()
            .oneshot(get_request(Some("Basic abc123")))
            .await
            .expect("response");

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let res = app()
            .oneshot(get_request(Some("Bearer not.a.token")))
            .await
            .expect("response");

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_the_handler_with_its_identity() {
        let credential = bearer_for("u1");
        let res = app()
            .oneshot(get_request(Some(credential.as_str())))
            .await
            .expect("response");

        assert_eq!(res.status(), StatusCode::OK);
    }
}
