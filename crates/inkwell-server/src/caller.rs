//! Caller identity from the `x-user-id` header.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use inkwell_commerce::prelude::*;

/// Header identifying the calling user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The raw caller id, if the request carried one.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<String>);

impl Caller {
    /// The calling user; `INVALID_TOKEN` if missing or unknown.
    pub fn user(&self, shop: &Shop) -> Result<User, CommerceError> {
        shop.users().authenticate(self.0.as_deref())
    }

    /// The calling user, who must be an admin.
    pub fn admin(&self, shop: &Shop) -> Result<User, CommerceError> {
        shop.users().authenticate_admin(self.0.as_deref())
    }

    /// The calling user if known, ignoring bad or missing ids.
    pub fn optional_user(&self, shop: &Shop) -> Option<User> {
        self.0.as_ref()?;
        self.user(shop).ok()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(Caller(id))
    }
}
