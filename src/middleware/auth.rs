use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthClaims, JwtError, TokenKeys};
use crate::database::models::UserLookup;
use crate::error::ApiError;

/// Path parameter that marks a route as user-scoped
pub const USERNAME_PARAM: &str = "username";

/// Request authorization: optional JWT authentication plus the login rule.
///
/// Holds the verification key (from configuration) and the user store used
/// for resource-owner checks. Cheap to clone; shared across requests.
#[derive(Clone)]
pub struct AuthGate {
    keys: TokenKeys,
    users: Arc<dyn UserLookup>,
}

impl AuthGate {
    pub fn new(secret: &str, users: Arc<dyn UserLookup>) -> Result<Self, JwtError> {
        Ok(Self {
            keys: TokenKeys::from_secret(secret)?,
            users,
        })
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    /// Verify the bearer token, if any.
    ///
    /// A missing, malformed, forged or expired token yields `None`; it is up
    /// to later stages to decide whether anonymous access is acceptable.
    pub fn authenticate(&self, headers: &HeaderMap) -> Option<AuthClaims> {
        let token = extract_token(headers)?;
        match self.keys.verify(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Ignoring invalid bearer token: {}", e);
                None
            }
        }
    }

    /// Decide whether an (optionally) authenticated caller may proceed.
    ///
    /// - anonymous callers are `Unauthorized`
    /// - on routes without a target username only admins pass
    /// - on user-scoped routes the target must exist (`NotFound` otherwise)
    ///   and be the caller, unless the caller is an admin
    pub async fn require_login(
        &self,
        claims: Option<&AuthClaims>,
        route_username: Option<&str>,
    ) -> Result<(), ApiError> {
        let claims = claims.ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        let Some(target) = route_username else {
            return if claims.is_admin {
                Ok(())
            } else {
                tracing::warn!("Non-admin '{}' denied on admin route", claims.username);
                Err(ApiError::unauthorized("Unauthorized"))
            };
        };

        self.users.get(target).await?;

        if target != claims.username && !claims.is_admin {
            tracing::warn!("User '{}' denied access to '{}'", claims.username, target);
            return Err(ApiError::unauthorized("Unauthorized"));
        }

        Ok(())
    }
}

/// Bearer token from the `Authorization` header, prefix stripped and trimmed
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = match raw.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => &raw[7..],
        _ => raw,
    };
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware: attach verified claims to the request. Never rejects.
pub async fn authenticate_jwt(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(claims) = gate.authenticate(request.headers()) {
        tracing::debug!("Authenticated '{}' (admin: {})", claims.username, claims.is_admin);
        request.extensions_mut().insert(claims);
    }
    next.run(request).await
}

/// Middleware: reject requests that fail [`AuthGate::require_login`]
pub async fn ensure_logged_in(
    State(gate): State<AuthGate>,
    params: Option<Path<HashMap<String, String>>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let route_username = params
        .as_ref()
        .and_then(|Path(p)| p.get(USERNAME_PARAM))
        .map(String::as_str);

    let claims = request.extensions().get::<AuthClaims>().cloned();
    gate.require_login(claims.as_ref(), route_username).await?;

    Ok(next.run(request).await)
}
