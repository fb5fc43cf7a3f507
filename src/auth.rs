use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    repository::RepositoryState,
};

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers use this
/// struct to stamp new content with its author and to run ownership checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// ensure_author
///
/// The single reusable ownership gate, applied uniformly to update and delete
/// of posts and comments. Allows the operation only when the acting user is
/// the stored author; rejects with 403 otherwise, before any mutation runs.
///
/// Never applied to create (creation always assigns the acting user as
/// author) or to any group operation (groups expose no mutation).
pub fn ensure_author(user: &AuthUser, author_id: i64) -> Result<(), ApiError> {
    if user.id != author_id {
        return Err(ApiError::PermissionDenied);
    }
    Ok(())
}

/// verify_password
///
/// Argon2 verification of a plaintext candidate against the stored PHC-format
/// hash. A malformed stored hash counts as a failed verification rather than
/// an internal error, so a corrupt row cannot be used to log in.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("stored password hash is not valid PHC: {:?}", e);
            false
        }
    }
}

/// generate_token
///
/// A fresh opaque token candidate. Random v4 UUID in simple form: 32 hex
/// characters, no structure for a client to interpret.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any authenticated handler and keeping authentication
/// (extractor) cleanly separated from business logic (the handler).
///
/// The process:
/// 1. Dependency resolution: Repository and AppConfig from the app state.
/// 2. Local bypass: development-time access via the 'x-user-id' header.
/// 3. Token resolution: Bearer token looked up in the token store.
///
/// Rejection: ApiError::Unauthenticated (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local Development Bypass Check
        // Under Env::Local a request may authenticate with a known user id in
        // the 'x-user-id' header, skipping token issuance during development.
        // The id must still resolve to a real user row.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = id_str.parse::<i64>() {
                        if let Ok(Some(user)) = repo.get_user(user_id).await {
                            return Ok(AuthUser {
                                id: user.id,
                                username: user.username,
                            });
                        }
                    }
                }
            }
        }
        // In Production, or when the bypass did not resolve, fall through to
        // standard bearer token authentication.

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        // Token lookup is the whole validation: tokens are opaque and live in
        // the store. An unknown token and a deleted user look the same here.
        let user = repo
            .get_user_by_token(token)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}
