use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::state::AppState;

/// A user resolved by an upstream authentication layer. When present in the
/// request extensions it takes precedence over the demo fallback.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// The user every handler acts on behalf of.
///
/// Resolution order:
/// 1. `AuthenticatedUser` in request extensions
/// 2. the configured demo user (`SOVEREIGN_DEMO_USER_ID`)
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(CurrentUser {
                id: user.user_id.clone(),
            });
        }
        Ok(CurrentUser {
            id: state.config.demo_user_id.clone(),
        })
    }
}

impl CurrentUser {
    /// Ownership check used by the by-id routes: rows of other users are
    /// reported as missing.
    pub fn owns(&self, user_id: &str) -> bool {
        self.id == user_id
    }
}
