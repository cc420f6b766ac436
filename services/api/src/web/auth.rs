//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for signup, login, token refresh, and logout.

use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;
use wellbeing_core::domain::TokenKind;
use wellbeing_core::ports::PortError;

use crate::web::middleware::{access_token, SESSION_COOKIE};
use crate::web::rest::port_error_response;
use crate::web::state::{AppState, AuthUser};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by signup and login. `access` is also set as the session cookie.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub access: String,
    pub refresh: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn token_ttl(state: &AppState, kind: TokenKind) -> Result<Duration, (StatusCode, String)> {
    let ttl = match kind {
        TokenKind::Access => Duration::try_minutes(state.config.access_token_ttl_minutes),
        TokenKind::Refresh => Duration::try_days(state.config.refresh_token_ttl_days),
    };
    ttl.ok_or_else(|| {
        error!("Configured {} token lifetime is out of range.", kind.as_str());
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
    })
}

/// Mints a random token of `kind`, stores it, and returns it.
async fn issue_token(
    state: &AppState,
    user_id: Uuid,
    kind: TokenKind,
) -> Result<String, (StatusCode, String)> {
    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + token_ttl(state, kind)?;

    state
        .db
        .create_auth_token(&token, user_id, kind, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create {} token: {:?}", kind.as_str(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;

    Ok(token)
}

fn session_cookie(access: &str, max_age: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        access,
        max_age.num_seconds()
    )
}

/// Issues an access/refresh pair and builds the signup/login response.
async fn start_session(
    state: &AppState,
    user_id: Uuid,
    email: String,
) -> Result<(String, AuthResponse), (StatusCode, String)> {
    let access = issue_token(state, user_id, TokenKind::Access).await?;
    let refresh = issue_token(state, user_id, TokenKind::Refresh).await?;
    let cookie = session_cookie(&access, token_ttl(state, TokenKind::Access)?);

    Ok((
        cookie,
        AuthResponse {
            user_id,
            email,
            access,
            refresh,
        },
    ))
}

fn require_credentials(email: &str, password: &str) -> Result<(), (StatusCode, String)> {
    if email.is_empty() || password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let email = req.email.trim();
    require_credentials(email, &req.password)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })?
        .to_string();

    let user = state
        .db
        .create_user_with_email(email, &password_hash)
        .await
        .map_err(|e| port_error_response(e, "create user"))?;

    let (cookie, response) =
        start_session(&state, user.user_id, user.email.unwrap_or_default()).await?;
    info!(user_id = %user.user_id, "New user signed up.");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let invalid = || (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string());

    let email = req.email.trim();
    require_credentials(email, &req.password)?;

    let user_creds = state.db.get_user_by_email(email).await.map_err(|e| match e {
        PortError::NotFound(_) => invalid(),
        other => port_error_response(other, "look up user"),
    })?;

    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    let (cookie, response) = start_session(&state, user_creds.user_id, user_creds.email).await?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/token/refresh - Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Invalid or expired refresh token"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = state
        .db
        .validate_auth_token(req.refresh.trim(), TokenKind::Refresh)
        .await
        .map_err(|e| port_error_response(e, "validate refresh token"))?;

    let access = issue_token(&state, user_id, TokenKind::Access).await?;
    let cookie = session_cookie(&access, token_ttl(&state, TokenKind::Access)?);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(RefreshResponse { access }),
    ))
}

/// POST /auth/logout - Invalidate the presented tokens
///
/// The access token is read from the bearer header or session cookie; an
/// optional JSON body may also name the refresh token to revoke.
#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body(content = LogoutRequest, description = "Optional; names the refresh token to revoke."),
    responses(
        (status = 200, description = "Logout successful"),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let req: LogoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid logout body: {}", e)))?
    };

    let presented: Vec<&str> = access_token(&headers)
        .into_iter()
        .chain(req.refresh.as_deref().map(str::trim))
        .filter(|t| !t.is_empty())
        .collect();

    if presented.is_empty() {
        return Err((StatusCode::UNAUTHORIZED, "No session found".to_string()));
    }

    for token in presented {
        state.db.delete_auth_token(token).await.map_err(|e| {
            error!("Failed to delete auth token: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
        })?;
    }

    let cookie = format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    );

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// GET /auth/user - The signed-in user
#[utoipa::path(
    get,
    path = "/auth/user",
    responses(
        (status = 200, description = "The current user", body = UserResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn current_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    let user = state
        .db
        .get_user_by_id(user_id)
        .await
        .map_err(|e| port_error_response(e, "load user"))?;

    Ok(Json(UserResponse {
        user_id: user.user_id,
        email: user.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedSentimentAdapter, MemoryAdapter, OfflineInsightsModel};
    use crate::config::Config;
    use tokio_util::sync::CancellationToken;
    use wellbeing_core::insights::{JournalInsightsFlow, KeywordExtractor};

    fn state_with(access_minutes: i64, refresh_days: i64) -> AppState {
        let mut config = Config::from_lookup(|key| {
            (key == "AI_BACKEND").then(|| "offline".to_string())
        })
        .unwrap();
        config.access_token_ttl_minutes = access_minutes;
        config.refresh_token_ttl_days = refresh_days;

        AppState {
            db: Arc::new(MemoryAdapter::new()),
            config: Arc::new(config),
            insights: JournalInsightsFlow::new(
                KeywordExtractor::new(Arc::new(FixedSentimentAdapter::default())),
                Arc::new(OfflineInsightsModel::new()),
            ),
            shutdown: CancellationToken::new(),
        }
    }

    #[test]
    fn token_ttl_follows_config() {
        let state = state_with(15, 2);
        assert_eq!(token_ttl(&state, TokenKind::Access).unwrap(), Duration::minutes(15));
        assert_eq!(token_ttl(&state, TokenKind::Refresh).unwrap(), Duration::days(2));
    }

    #[tokio::test]
    async fn oversized_ttl_fails_the_request_instead_of_panicking() {
        let state = state_with(i64::MAX, i64::MAX);
        let (status, _) = token_ttl(&state, TokenKind::Access).unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(token_ttl(&state, TokenKind::Refresh).is_err());

        let (status, _) = issue_token(&state, Uuid::new_v4(), TokenKind::Access)
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
