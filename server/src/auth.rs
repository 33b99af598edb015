// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers::AppError;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

// The identity service that mints tokens for real users is a separate
// deployment; this module only has to verify them. A token is
// `<user-id>.<hex sha256(user-id ':' secret)>`.
const SECRET_ENV: &str = "TOKEN_SECRET";
const DEV_SECRET: &str = "dev-secret-change-me";

fn secret() -> String {
    std::env::var(SECRET_ENV).unwrap_or_else(|_| DEV_SECRET.to_string())
}

fn signature(user_id: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mints a bearer token for the given user id. Used by the test suite and by
/// local tooling; production tokens come from the identity service with the
/// same shared secret.
pub fn issue_token(user_id: &str) -> String {
    format!("{}.{}", user_id, signature(user_id, &secret()))
}

/// Decodes a bearer token back to its owner id, or `None` if the token is
/// empty, malformed, or carries a bad signature.
pub fn owner_from_token(token: &str) -> Option<String> {
    let (user_id, sig) = token.rsplit_once('.')?;
    if user_id.is_empty() {
        return None;
    }
    if sig == signature(user_id, &secret()) {
        Some(user_id.to_string())
    } else {
        None
    }
}

/// The authenticated owner of the current request.
///
/// Extracting this in a handler signature makes the route require a valid
/// `Authorization: Bearer <token>` header; absence or an undecodable token
/// rejects with 401 before the handler body runs, and before any storage
/// access.
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(AppError::unauthorized)?;
        let owner = owner_from_token(token).ok_or_else(AppError::unauthorized)?;
        Ok(AuthUser(owner))
    }
}
