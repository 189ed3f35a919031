//! Cookie session authentication
//!
//! The session is an HS256 JWT stored in the `pos_session` cookie. Browsers
//! send it on both REST calls and the WebSocket upgrade, so one middleware
//! guards everything.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;
use http::header::{COOKIE, HeaderValue};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserRole};

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "pos_session";

/// JWT claims carried in the session cookie
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: i64,
    pub tenant_id: i64,
    pub username: String,
    pub role: UserRole,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user identity extracted from the session cookie
#[derive(Debug, Clone, PartialEq)]
pub struct SessionIdentity {
    pub user_id: i64,
    pub tenant_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl SessionIdentity {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            tenant_id: user.tenant_id,
            username: user.username.clone(),
            role: user.role,
        }
    }

    /// Tenant path segments and entity owners must match the session tenant
    pub fn ensure_tenant(&self, tenant_id: i64) -> Result<(), AppError> {
        if self.tenant_id != tenant_id {
            tracing::warn!(
                user_id = self.user_id,
                session_tenant = self.tenant_id,
                requested_tenant = tenant_id,
                "Cross-tenant access rejected"
            );
            return Err(AppError::tenant_mismatch());
        }
        Ok(())
    }
}

impl From<SessionClaims> for SessionIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

pub fn create_token(
    identity: &SessionIdentity,
    secret: &str,
    max_age_days: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = SessionClaims {
        sub: identity.user_id,
        tenant_id: identity.tenant_id,
        username: identity.username.clone(),
        role: identity.role,
        exp: (now + chrono::Duration::days(max_age_days)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// `Set-Cookie` value for a fresh session
pub fn session_cookie(token: &str, max_age_days: i64, secure: bool) -> Result<HeaderValue, AppError> {
    let max_age = max_age_days * 24 * 60 * 60;
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AppError::internal(format!("Invalid cookie: {e}")))
}

/// `Set-Cookie` value that expires the session immediately
pub fn clear_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("pos_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("pos_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

/// Find a cookie by name across all `Cookie` headers
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// Identity from the request cookie, if present and valid
pub fn identity_from_headers(headers: &HeaderMap, secret: &str) -> Result<SessionIdentity, AppError> {
    let token = read_cookie(headers, SESSION_COOKIE).ok_or_else(AppError::not_authenticated)?;
    match verify_token(token, secret) {
        Ok(claims) => Ok(claims.into()),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            Err(AppError::new(ErrorCode::SessionExpired))
        }
        Err(e) => {
            tracing::debug!("Session token rejected: {e}");
            Err(AppError::not_authenticated())
        }
    }
}

/// Rejects requests without a valid session with 401 and inserts
/// [`SessionIdentity`] into the request extensions.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = identity_from_headers(request.headers(), &state.session_secret)?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
