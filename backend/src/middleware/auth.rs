//! Authentication middleware
//!
//! Sessions are JWTs carried in the session cookie, or in an
//! `Authorization: Bearer` header for non-browser clients.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorDetail, ErrorResponse};
use crate::AppState;

/// Authenticated user information extracted from the session
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub shop_id: Uuid,
}

/// Session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub shop_id: String,
    pub exp: i64,
    pub iat: i64,
}

/// Validates the session and stores an [`AuthUser`] in the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(&state.config.jwt.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(&request));

    let Some(token) = token else {
        return unauthorized_response("Missing session");
    };

    let auth_user = match decode_session(&token, &state.config.jwt.secret) {
        Ok(user) => user,
        Err(msg) => {
            tracing::debug!("Rejected session: {}", msg);
            return unauthorized_response(&msg);
        }
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Decode and validate a session token
pub fn decode_session(token: &str, secret: &str) -> Result<AuthUser, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => "Session has expired".to_string(),
        _ => format!("Invalid session: {}", e),
    })?;

    let user_id =
        Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in session".to_string())?;
    let shop_id =
        Uuid::parse_str(&claims.shop_id).map_err(|_| "Invalid shop ID in session".to_string())?;

    Ok(AuthUser { user_id, shop_id })
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail::new("UNAUTHORIZED", message),
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail::new("UNAUTHORIZED", "Authentication required"),
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
