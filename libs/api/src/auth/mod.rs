use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{self, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::response::{ApiResponse, IntoApiResponse as _};
use crate::session::SessionEvent;
use crate::{ApiError, ApiState, JWT_SECRET};
use entity::user::Role;

pub mod request;
pub mod response;

use self::request::{SignInRequest, SignUpRequest};
use self::response::{MeResponse, TokenResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// The acting user, decoded from the bearer token of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.sub,
            role: claims.role.into(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        user_from_headers(&parts.headers)
    }
}

/// Session gate for the management routes: the token is checked before any
/// handler runs. This is a point-in-time check; a sign-out racing an
/// already-admitted request is accepted.
pub async fn require_user(
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = user_from_headers(req.headers())?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

fn user_from_headers(headers: &HeaderMap) -> Result<CurrentUser, ApiError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let Some(auth_header) = auth_header else {
        return Err(ApiError::AuthError(
            "Authorization header is missing".to_string(),
        ));
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return Err(ApiError::AuthError(
            "Authorization header is not a bearer token".to_string(),
        ));
    };

    let Some(secret) = JWT_SECRET.get() else {
        return Err(ApiError::ServerError(
            "token secret is not initialized".to_string(),
        ));
    };

    let claims = decode_token(token, secret)
        .map_err(|_| ApiError::AuthError("invalid or expired token".to_string()))?;

    Ok(claims.into())
}

pub(crate) fn encode_token(
    user_id: Uuid,
    email: &str,
    role: Role,
    secret: &str,
    hours: i64,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        user_id,
        role: String::from(role),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(hours)).timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub(crate) fn decode_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(data.claims)
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {}", e))?;

    Ok(hash.to_string())
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Create an account
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = TokenResponse),
        (status = 401, description = "The email is already registered")
    )
)]
pub async fn sign_up(
    State(state): State<ApiState>,
    Json(body): Json<SignUpRequest>,
) -> ApiResponse<(StatusCode, Json<TokenResponse>)> {
    if !body.email.contains('@') {
        return Err(ApiError::ClientError(
            "a valid email address is required".to_string(),
        ));
    }
    if body.password.len() < 6 {
        return Err(ApiError::ClientError(
            "the password must be at least 6 characters".to_string(),
        ));
    }

    let existing = state
        .repo
        .user
        .find_by_email(&body.email)
        .await
        .into_response("in find user by email")?;
    if existing.is_some() {
        return Err(ApiError::AuthError(
            "this email is already registered".to_string(),
        ));
    }

    // The first account bootstraps the editor role; everyone after that
    // starts as a reporter.
    let count = state
        .repo
        .user
        .count()
        .await
        .into_response("in count users")?;
    let role = if count == 0 { Role::Editor } else { Role::Reporter };

    let password_hash =
        hash_password(&body.password).into_response("in hash password")?;

    let user = state
        .repo
        .user
        .create(body.email, password_hash, role)
        .await
        .into_response("in create user")?;

    info!(task = "sign up", user_id = user.id.to_string());

    let token = issue_token(&state, user.id, &user.email, user.role)?;
    state.sessions.publish(SessionEvent::SignedIn {
        user_id: user.id,
        email: user.email,
    });

    Ok((StatusCode::CREATED, Json(token)))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn sign_in(
    State(state): State<ApiState>,
    Json(body): Json<SignInRequest>,
) -> ApiResponse<Json<TokenResponse>> {
    let user = state
        .repo
        .user
        .find_by_email(&body.email)
        .await
        .into_response("in find user by email")?;

    let Some(user) = user else {
        return Err(ApiError::AuthError("invalid credentials".to_string()));
    };

    if !verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::AuthError("invalid credentials".to_string()));
    }

    info!(task = "sign in", user_id = user.id.to_string());

    let token = issue_token(&state, user.id, &user.email, user.role)?;
    state.sessions.publish(SessionEvent::SignedIn {
        user_id: user.id,
        email: user.email,
    });

    Ok(Json(token))
}

/// Sign out
///
/// Tokens are stateless, so an already-issued token stays decodable until
/// it expires; signing out publishes the transition and the client drops
/// the token.
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn sign_out(
    State(state): State<ApiState>,
    user: CurrentUser,
) -> ApiResponse<StatusCode> {
    info!(task = "sign out", user_id = user.id.to_string());

    state
        .sessions
        .publish(SessionEvent::SignedOut { user_id: user.id });

    Ok(StatusCode::OK)
}

/// The currently signed-in user
///
/// Answers from the stored account, not the token, so a role change lands
/// here before the token is reissued.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The current user", body = MeResponse),
        (status = 401, description = "Not signed in, or the account no longer exists")
    )
)]
pub async fn me(
    State(state): State<ApiState>,
    user: CurrentUser,
) -> ApiResponse<Json<MeResponse>> {
    let account = state
        .repo
        .user
        .find_by_id(user.id)
        .await
        .into_response("in find user by id")?;

    let Some(account) = account else {
        return Err(ApiError::AuthError(
            "this account no longer exists".to_string(),
        ));
    };

    Ok(Json(MeResponse {
        id: account.id,
        email: account.email,
        role: account.role.as_str().to_string(),
    }))
}

fn issue_token(
    state: &ApiState,
    user_id: Uuid,
    email: &str,
    role: Role,
) -> ApiResponse<TokenResponse> {
    let Some(secret) = JWT_SECRET.get() else {
        return Err(ApiError::ServerError(
            "token secret is not initialized".to_string(),
        ));
    };

    let token =
        encode_token(user_id, email, role, secret, state.config.auth.token_hours)
            .into_response("in encode token")?;

    Ok(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_token_claims_round_trip() {
        // Arrange
        let user_id = Uuid::new_v4();

        // Act
        let token = encode_token(
            user_id,
            "reporter@uni.edu",
            Role::Editor,
            "test-secret",
            24,
        )
        .unwrap();
        let claims = decode_token(&token, "test-secret").unwrap();

        // Assert
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.sub, "reporter@uni.edu");
        assert_eq!(claims.role, "editor");
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = encode_token(
            Uuid::new_v4(),
            "reporter@uni.edu",
            Role::Reporter,
            "test-secret",
            24,
        )
        .unwrap();

        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_password_hash_verifies_only_the_original() {
        let hash = hash_password("hunter2!").unwrap();

        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
        assert!(!verify_password("hunter2!", "not-a-phc-string"));
    }
}
