//! services/api/src/web/middleware.rs
//!
//! The authorization guard: validates the bearer token on every protected
//! request and attaches the resolved user to the request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that validates the `Authorization: Bearer <token>` header,
/// verifies the token, and resolves it to an existing account.
///
/// On success the user's public identity is inserted into request extensions
/// for handlers to use. Each request is independently authorized: one token
/// verification plus one user fetch, no cross-request caching.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("invalid authorization scheme".to_string()))?;

    if token.is_empty() {
        return Err(ApiError::Unauthorized("no token provided".to_string()));
    }

    let user_id = state.signer.verify(token).map_err(|e| {
        warn!("token verification failed: {}", e);
        ApiError::Unauthorized("invalid or expired token".to_string())
    })?;

    // The token may outlive the account it was issued for.
    let user = state
        .db
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("account no longer exists".to_string()))?;

    req.extensions_mut().insert(user.public());

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        middleware as axum_middleware,
        routing::get,
        Extension, Router,
    };
    use recipe_share_core::domain::PublicUser;
    use recipe_share_core::ports::{DatabaseService, NewUser};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn whoami(Extension(user): Extension<PublicUser>) -> String {
        user.username
    }

    fn guarded_router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                require_auth,
            ))
            .with_state(state)
    }

    fn request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn status_for(authorization: Option<&str>) -> StatusCode {
        let router = guarded_router(test_state());
        router.oneshot(request(authorization)).await.unwrap().status()
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        assert_eq!(
            status_for(Some("Basic dXNlcjpwYXNz")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn empty_token_is_unauthorized() {
        assert_eq!(status_for(Some("Bearer ")).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        assert_eq!(
            status_for(Some("Bearer not.a.token")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn token_for_a_deleted_account_is_unauthorized() {
        let state = test_state();
        // Well-signed token, but its subject never existed in the store.
        let token = state.signer.issue(Uuid::new_v4()).unwrap();
        let response = guarded_router(state)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_the_handler_with_the_user_attached() {
        let state = test_state();
        let user = state
            .db
            .create_user(NewUser {
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "$argon2id$stub".to_string(),
            })
            .await
            .unwrap();
        let token = state.signer.issue(user.id).unwrap();

        let response = guarded_router(state)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ada");
    }
}
