//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: registration, login, and the current-user
//! lookup. Both registration and login issue a session token.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use recipe_share_core::domain::PublicUser;
use recipe_share_core::ports::NewUser;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::error;
use utoipa::ToSchema;

use crate::auth::password;
use crate::error::ApiError;
use crate::web::dto::UserDto;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

//=========================================================================================
// Validation helpers
//=========================================================================================

pub(crate) fn email_is_valid(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(email)
}

fn issue_token(state: &AppState, user: &PublicUser) -> Result<String, ApiError> {
    state.signer.issue(user.id).map_err(|e| {
        error!("failed to issue token: {}", e);
        ApiError::Internal("failed to issue token".to_string())
    })
}

fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    password::hash(plaintext).map_err(|e| {
        error!("failed to hash password: {}", e);
        ApiError::Internal("failed to hash password".to_string())
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new account and issue a token.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "please provide all required fields".to_string(),
        ));
    }
    if username.chars().count() < 3 {
        return Err(ApiError::InvalidInput(
            "username must be at least 3 characters long".to_string(),
        ));
    }
    if !email_is_valid(&email) {
        return Err(ApiError::InvalidInput("invalid email format".to_string()));
    }
    if req.password.chars().count() < 6 {
        return Err(ApiError::InvalidInput(
            "password must be at least 6 characters long".to_string(),
        ));
    }

    // Hash-on-write: the plaintext never reaches the store.
    let password_hash = hash_password(&req.password)?;

    let user = state
        .db
        .create_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await?
        .public();

    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /auth/login - Authenticate and issue a token.
///
/// Unknown email and wrong password produce the same opaque response, so the
/// endpoint does not reveal which emails have accounts.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "please enter all fields".to_string(),
        ));
    }

    let invalid = || ApiError::Unauthorized("invalid email or password".to_string());

    let user = state.db.user_by_email(&email).await?.ok_or_else(invalid)?;

    let matches = password::verify(&req.password, &user.password_hash).map_err(|e| {
        error!("failed to verify password: {}", e);
        ApiError::Internal("authentication error".to_string())
    })?;
    if !matches {
        return Err(invalid());
    }

    let user = user.public();
    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// GET /auth/me - The authenticated user's own identity.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The current user", body = UserDto),
        (status = 401, description = "Missing or invalid credential")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    Extension(user): Extension<PublicUser>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(UserDto::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn registration_issues_a_verifiable_token() {
        let state = test_state();
        let resp = register_handler(
            State(state.clone()),
            Json(register_req("ada", "ada@example.com", "hunter22")),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let user_id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
        let token = body["token"].as_str().unwrap();
        assert_eq!(state.signer.verify(token).unwrap(), user_id);
        // The credential hash never appears in the payload.
        assert!(body["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let state = test_state();
        register_handler(
            State(state.clone()),
            Json(register_req("ada", "ada@example.com", "hunter22")),
        )
        .await
        .unwrap();

        let err = register_handler(
            State(state.clone()),
            Json(register_req("ada", "other@example.com", "hunter22")),
        )
        .await
        .err().unwrap();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn malformed_registrations_are_rejected() {
        let state = test_state();
        for req in [
            register_req("ab", "ada@example.com", "hunter22"),
            register_req("ada", "not-an-email", "hunter22"),
            register_req("ada", "ada@example.com", "short"),
        ] {
            let err = register_handler(State(state.clone()), Json(req))
                .await
                .err().unwrap();
            assert!(matches!(err, ApiError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn login_failures_are_opaque() {
        let state = test_state();
        register_handler(
            State(state.clone()),
            Json(register_req("ada", "ada@example.com", "hunter22")),
        )
        .await
        .unwrap();

        let wrong_password = login_handler(
            State(state.clone()),
            Json(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await
        .err().unwrap();

        let unknown_email = login_handler(
            State(state.clone()),
            Json(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "hunter22".to_string(),
            }),
        )
        .await
        .err().unwrap();

        // Neither failure reveals whether the email has an account.
        assert!(matches!(wrong_password, ApiError::Unauthorized(_)));
        assert!(matches!(unknown_email, ApiError::Unauthorized(_)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn login_normalizes_the_email() {
        let state = test_state();
        register_handler(
            State(state.clone()),
            Json(register_req("ada", "Ada@Example.com", "hunter22")),
        )
        .await
        .unwrap();

        let resp = login_handler(
            State(state.clone()),
            Json(LoginRequest {
                email: "  ADA@example.COM ".to_string(),
                password: "hunter22".to_string(),
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
