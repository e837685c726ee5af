//! Site selection for incoming requests.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::AppState;

/// Header naming the site a request is for.
pub const SITE_HEADER: &str = "x-site-id";

/// The site a request is scoped to: the `x-site-id` header, else the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteId(pub i64);

impl FromRequestParts<AppState> for SiteId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(SITE_HEADER) else {
            return Ok(SiteId(state.config.default_site_id));
        };

        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .map(SiteId)
            .ok_or_else(|| AppError::BadRequest(format!("{} must be an integer", SITE_HEADER)))
    }
}
