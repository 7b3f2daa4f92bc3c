use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{self, Claims};
use crate::error::ApiError;

/// Caller identity from a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub store_hash: Option<String>,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            store_hash: claims.store_hash,
            role: claims.role,
        }
    }
}

impl AuthUser {
    /// Store scope for bulk SKU operations: every store for a master
    /// superadmin, the caller's own store for a superadmin, nothing for
    /// other roles.
    pub fn bulk_scope(&self) -> Result<Option<&str>, ApiError> {
        match self.role.as_str() {
            "mastersuperadmin" => Ok(None),
            "superadmin" => self
                .store_hash
                .as_deref()
                .filter(|hash| !hash.is_empty())
                .map(Some)
                .ok_or_else(|| ApiError::forbidden("No store is associated with this account")),
            _ => Err(ApiError::forbidden(
                "Only superadmin or mastersuperadmin can perform this action",
            )),
        }
    }
}

/// Rejects requests without a valid bearer token and makes the caller
/// available to handlers as an `AuthUser` extension
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    let claims = auth::decode_jwt(token)?;

    let auth_user = AuthUser::from(claims);
    debug!(user_id = auth_user.user_id, "Authenticated request");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();
    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}
