use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines the **unauthenticated** endpoints, accessible to any client.
/// Read access to posts, groups and comments is open by contract; the only
/// public write is token issuance, which is what bootstraps authentication.
///
/// Note the deliberate absence of any mutating group route: groups are
/// read-only through this API, so POST/PUT/PATCH/DELETE on the group paths
/// are answered with 405 by the router itself.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /api-token-auth
        // Exchanges username/password for the user's opaque bearer token.
        .route("/api-token-auth", post(handlers::obtain_token))
        // GET /posts
        // Lists all posts, newest first.
        .route("/posts", get(handlers::get_posts))
        // GET /posts/{id}
        // Retrieves a single post.
        .route("/posts/{id}", get(handlers::get_post_detail))
        // GET /groups, GET /groups/{id}
        // The entire group surface: read-only.
        .route("/groups", get(handlers::get_groups))
        .route("/groups/{id}", get(handlers::get_group_detail))
        // GET /posts/{post_id}/comments
        // Lists the comments of one post. Resolves the parent first; an
        // unknown post id is a 404 even though the list itself may be empty.
        .route("/posts/{post_id}/comments", get(handlers::get_comments))
        // GET /posts/{post_id}/comments/{id}
        // Parent-scoped comment retrieval.
        .route(
            "/posts/{post_id}/comments/{id}",
            get(handlers::get_comment_detail),
        )
}
