//! Authenticated actor, read from the header the upstream auth layer sets.

use crate::errors::Error;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the authenticated user id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Extractor for the user performing a request.
///
/// Absent, malformed, or non-positive ids are rejected with `Error::InvalidActor` before
/// the request body is read. Whether the user exists is checked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(Actor)
            .ok_or(Error::InvalidActor)
    }
}
