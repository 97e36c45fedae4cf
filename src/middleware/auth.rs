use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::app::AppState;
use crate::auth::{AuthError, AuthUser};
use crate::error::ApiError;

/// A permission scope a route can demand
pub trait Permission: Send + Sync + 'static {
    const SCOPE: &'static str;
}

pub struct GetDrinksDetail;
pub struct PostDrinks;
pub struct PatchDrinks;
pub struct DeleteDrinks;

impl Permission for GetDrinksDetail {
    const SCOPE: &'static str = "get:drinks-detail";
}

impl Permission for PostDrinks {
    const SCOPE: &'static str = "post:drinks";
}

impl Permission for PatchDrinks {
    const SCOPE: &'static str = "patch:drinks";
}

impl Permission for DeleteDrinks {
    const SCOPE: &'static str = "delete:drinks";
}

/// Proof that the request carried a verified token granting `P`.
///
/// Extraction runs token verification and the scope check once, before the
/// handler body sees the payload.
pub struct Authorized<P: Permission> {
    pub user: AuthUser,
    _scope: PhantomData<fn() -> P>,
}

#[async_trait]
impl<P: Permission> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let result = authorize(&parts.headers, state, P::SCOPE).await;

        match result {
            Ok(user) => Ok(Self {
                user,
                _scope: PhantomData,
            }),
            Err(err) => {
                tracing::warn!(scope = P::SCOPE, path = %parts.uri.path(), "Authorization failed: {}", err);
                Err(ApiError::from(err))
            }
        }
    }
}

async fn authorize(headers: &HeaderMap, state: &AppState, scope: &str) -> Result<AuthUser, AuthError> {
    let token = extract_jwt_from_headers(headers)?;
    let user = state.authorizer.verify(token).await?;
    user.require(scope)?;
    Ok(user)
}

/// Extract the token from a two-part `Bearer <token>` Authorization header
pub fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AuthError::MissingToken("Authorization header is expected.".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MissingToken("Invalid Authorization header format.".to_string()))?;

    let mut parts = auth_str.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        (Some(scheme), _, _) if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::MissingToken(
            "Authorization header must start with \"Bearer\".".to_string(),
        )),
        (Some(_), None, _) => Err(AuthError::MissingToken("Token not found.".to_string())),
        _ => Err(AuthError::MissingToken(
            "Authorization header must be bearer token.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(extract_jwt_from_headers(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            extract_jwt_from_headers(&HeaderMap::new()),
            Err(AuthError::MissingToken(_))
        ));
    }

    #[test]
    fn rejects_malformed_headers() {
        for value in ["Basic dXNlcjpwdw==", "Bearer", "Bearer a b", "", "Token abc"] {
            assert!(
                matches!(extract_jwt_from_headers(&headers(value)), Err(AuthError::MissingToken(_))),
                "accepted {:?}",
                value
            );
        }
    }

    #[test]
    fn scopes_match_route_permissions() {
        assert_eq!(GetDrinksDetail::SCOPE, "get:drinks-detail");
        assert_eq!(PostDrinks::SCOPE, "post:drinks");
        assert_eq!(PatchDrinks::SCOPE, "patch:drinks");
        assert_eq!(DeleteDrinks::SCOPE, "delete:drinks");
    }
}
