use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{patch, post, put},
};

/// Authenticated Router Module
///
/// Defines every mutating route. The router returned here is wrapped by the
/// `AuthUser` middleware layer in `create_router`, so a request without a
/// resolvable bearer token is rejected with 401 before any handler runs.
///
/// Handlers still take `AuthUser` as an argument: the middleware guarantees
/// authentication, the extractor hands the identity to the ownership checks
/// (`ensure_author`) inside each update/delete handler.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /posts
        // Submits a new post. The author is always the acting user.
        .route("/posts", post(handlers::create_post))
        // PUT/PATCH/DELETE /posts/{id}
        // Owner-only modification and removal. PUT and PATCH share the
        // partial-update handler; omitted fields are left untouched.
        .route(
            "/posts/{id}",
            put(handlers::update_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // POST /posts/{post_id}/comments
        // Adds a comment under the resolved parent post.
        .route("/posts/{post_id}/comments", post(handlers::add_comment))
        // PUT/PATCH/DELETE /posts/{post_id}/comments/{id}
        // Owner-only comment modification and removal, parent-scoped.
        .route(
            "/posts/{post_id}/comments/{id}",
            patch(handlers::update_comment)
                .put(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
}
