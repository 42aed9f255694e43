//! Admin authentication extractor.
//!
//! Admins sign in through the hosted auth service like customers do and send
//! the access token as `Authorization: Bearer <token>`. The token must
//! belong to a profile with `is_admin` set.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::db::ProfileRepository;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;
use crate::supabase::{AuthUser, SupabaseError};

/// Extractor that requires a valid bearer token for an admin profile.
///
/// Missing or rejected tokens are 401; a valid token for a non-admin is 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> String {
///     format!("Hello, {}!", admin.id)
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let user = state.auth().get_user(token).await.map_err(|e| match e {
            SupabaseError::Unauthorized => {
                AppError::Unauthorized("Invalid or expired token".to_string())
            }
            other => AppError::Supabase(other),
        })?;

        set_sentry_user(&user.id, user.email.as_deref());
        tracing::Span::current().record("user_id", tracing::field::display(&user.id));

        if !ProfileRepository::new(state.pool()).is_admin(user.id).await? {
            tracing::warn!(user_id = %user.id, "Non-admin rejected");
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(user))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok.en"));
        assert_eq!(bearer_token(&headers), Some("tok.en"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token tok.en"));
        assert_eq!(bearer_token(&headers), None);
    }
}
