use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table, as resolved during
/// authentication. Internal only: it carries the password hash, so it is
/// deliberately not serializable and never crosses the wire.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Post
///
/// A post record joined with its author's username. The primary data
/// structure for the core business logic.
///
/// `author_id` is what ownership checks compare against; the wire format
/// carries only the `author` username, so the raw FK is skipped by serde.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: i64,
    #[serde(skip)]
    #[ts(skip)]
    #[schema(ignore)]
    pub author_id: i64,
    pub text: String,
    /// Author's username, loaded via a JOIN in the repository query.
    pub author: String,
    #[ts(type = "string")]
    pub pub_date: DateTime<Utc>,
    /// Opaque key/URL of an attached image, if any.
    pub image: Option<String>,
    /// Optional reference to a Group id.
    pub group: Option<i64>,
}

/// Group
///
/// A read-only community record. Groups are administered out of band; this
/// API never writes them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Comment
///
/// A comment record scoped to one post, joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    #[serde(skip)]
    #[ts(skip)]
    #[schema(ignore)]
    pub author_id: i64,
    pub text: String,
    pub author: String,
    /// Owning post id, fixed at creation from the URL path.
    pub post: i64,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Input payload for submitting a new post (POST /v1/posts). There is no
/// author field by design: the author is always the acting user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub text: String,
    pub image: Option<String>,
    pub group: Option<i64>,
}

/// UpdatePostRequest
///
/// Partial update payload for PUT/PATCH /v1/posts/{id}. All fields are
/// `Option<T>` so only the provided fields are applied (COALESCE in the
/// repository query).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment. Author and parent post come from
/// the token and the URL path, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub text: String,
}

/// UpdateCommentRequest
///
/// Partial update payload for PUT/PATCH on a comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCommentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// --- Token Endpoint Schemas ---

/// TokenRequest
///
/// Credentials payload for POST /v1/api-token-auth.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// TokenResponse
///
/// The opaque bearer token issued for valid credentials. Stable per user:
/// repeated requests return the same token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}
