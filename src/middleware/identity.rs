use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderValue},
};

use crate::auth::Identity;
use crate::error::ApiError;

/// Request header carrying the serialized identity to downstream handlers
pub const IDENTITY_HEADER: &str = "x-decoded-token";

/// Hand a verified identity to everything after the gate, both as a typed
/// request extension and as a JSON header.
pub fn attach_identity(request: &mut Request, identity: Identity) {
    match serde_json::to_string(&identity)
        .ok()
        .and_then(|json| HeaderValue::from_bytes(json.as_bytes()).ok())
    {
        Some(value) => {
            request.headers_mut().insert(IDENTITY_HEADER, value);
        }
        None => tracing::warn!(id = %identity.id, "identity could not be encoded as a header"),
    }

    request.extensions_mut().insert(identity);
}

/// Drop any identity header the client sent itself
pub fn strip_identity(request: &mut Request) {
    if request.headers_mut().remove(IDENTITY_HEADER).is_some() {
        tracing::warn!(path = %request.uri().path(), "discarded client-supplied {} header", IDENTITY_HEADER);
    }
}

/// Extractor for the identity the gate admitted.
///
/// Only present on routes inside a protected partition; anywhere else the
/// request is rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(CurrentIdentity(identity.clone()));
        }

        parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| serde_json::from_slice::<Identity>(value.as_bytes()).ok())
            .map(CurrentIdentity)
            .ok_or_else(|| ApiError::unauthorized("No authenticated session for this route"))
    }
}
