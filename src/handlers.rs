use crate::{
    AppState,
    auth::{self, AuthUser, ensure_author},
    error::ApiError,
    models::{
        Comment, CreateCommentRequest, CreatePostRequest, Group, Post, TokenRequest,
        TokenResponse, UpdateCommentRequest, UpdatePostRequest,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

// --- Shared Helpers ---

/// Field-level validation for post/comment bodies: text is required and may
/// not be blank.
fn require_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::validation("text", "This field may not be blank."));
    }
    Ok(())
}

/// Parent resolution for the nested comment routes: every comment operation
/// resolves the post named in the path first, and an unknown post id is a 404
/// before anything else happens.
async fn resolve_post(state: &AppState, post_id: i64) -> Result<Post, ApiError> {
    state.repo.get_post(post_id).await?.ok_or(ApiError::NotFound)
}

// --- Token Endpoint ---

/// obtain_token
///
/// [Public Route] Exchanges username/password credentials for the user's
/// opaque bearer token. The token is created on first request and returned
/// verbatim on every subsequent one.
///
/// Bad credentials are a 400 validation error (not 401): the request body is
/// what failed, there was no token to authenticate with.
#[utoipa::path(
    post,
    path = "/v1/api-token-auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let invalid = ApiError::validation(
        "non_field_errors",
        "Unable to log in with provided credentials.",
    );

    let user = state
        .repo
        .get_user_by_username(&payload.username)
        .await?
        .ok_or(invalid)?;

    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::validation(
            "non_field_errors",
            "Unable to log in with provided credentials.",
        ));
    }

    let token = state
        .repo
        .get_or_create_token(user.id, &auth::generate_token())
        .await?;

    Ok(Json(TokenResponse { token }))
}

// --- Post Handlers ---

/// get_posts
///
/// [Public Route] Lists all posts, newest first.
#[utoipa::path(
    get,
    path = "/v1/posts",
    responses((status = 200, description = "All posts", body = [Post]))
)]
pub async fn get_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.repo.list_posts().await?))
}

/// get_post_detail
///
/// [Public Route] Retrieves a single post by ID.
#[utoipa::path(
    get,
    path = "/v1/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, ApiError> {
    let post = state.repo.get_post(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(post))
}

/// create_post
///
/// [Authenticated Route] Submits a new post. The author is always the acting
/// user resolved from the token; the request schema has no author field, so
/// nothing a client sends can change that.
#[utoipa::path(
    post,
    path = "/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Validation Error"),
        (status = 401, description = "Not Authenticated")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    require_text(&payload.text)?;
    let post = state.repo.create_post(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// [Authenticated Route] Applies a partial update to a post the acting user
/// owns. Load, gate on authorship, then persist; a non-author gets 403
/// before any field is touched.
#[utoipa::path(
    patch,
    path = "/v1/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Not the Author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let existing = state.repo.get_post(id).await?.ok_or(ApiError::NotFound)?;
    ensure_author(&user, existing.author_id)?;

    if let Some(text) = &payload.text {
        require_text(text)?;
    }

    let updated = state
        .repo
        .update_post(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

/// delete_post
///
/// [Authenticated Route] Removes a post the acting user owns.
#[utoipa::path(
    delete,
    path = "/v1/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the Author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let existing = state.repo.get_post(id).await?.ok_or(ApiError::NotFound)?;
    ensure_author(&user, existing.author_id)?;

    if state.repo.delete_post(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        // Row vanished between the load and the delete.
        Err(ApiError::NotFound)
    }
}

// --- Group Handlers (read-only surface) ---

/// get_groups
///
/// [Public Route] Lists all groups. Groups have no write routes at all, so
/// mutating methods on these paths answer 405 at the router level.
#[utoipa::path(
    get,
    path = "/v1/groups",
    responses((status = 200, description = "All groups", body = [Group]))
)]
pub async fn get_groups(State(state): State<AppState>) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(state.repo.list_groups().await?))
}

/// get_group_detail
///
/// [Public Route] Retrieves a single group by ID.
#[utoipa::path(
    get,
    path = "/v1/groups/{id}",
    params(("id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Found", body = Group),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_group_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Group>, ApiError> {
    let group = state.repo.get_group(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(group))
}

// --- Comment Handlers (nested under a post) ---

/// get_comments
///
/// [Public Route] Lists exactly the comments belonging to the resolved
/// parent post. An existing post with no comments is an empty 200 list; an
/// unknown post id is a 404.
#[utoipa::path(
    get,
    path = "/v1/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Parent post ID")),
    responses(
        (status = 200, description = "Comments", body = [Comment]),
        (status = 404, description = "Parent post not found")
    )
)]
pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let parent = resolve_post(&state, post_id).await?;
    Ok(Json(state.repo.list_comments(parent.id).await?))
}

/// get_comment_detail
///
/// [Public Route] Retrieves one comment under the resolved parent. The
/// lookup is parent-scoped: a valid comment id under a different post is 404.
#[utoipa::path(
    get,
    path = "/v1/posts/{post_id}/comments/{id}",
    params(
        ("post_id" = i64, Path, description = "Parent post ID"),
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Found", body = Comment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_comment_detail(
    State(state): State<AppState>,
    Path((post_id, id)): Path<(i64, i64)>,
) -> Result<Json<Comment>, ApiError> {
    let parent = resolve_post(&state, post_id).await?;
    let comment = state
        .repo
        .get_comment(parent.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(comment))
}

/// add_comment
///
/// [Authenticated Route] Posts a new comment under the resolved parent.
/// Author comes from the token, the owning post from the path; the body
/// carries only the text.
#[utoipa::path(
    post,
    path = "/v1/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Parent post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Parent post not found")
    )
)]
pub async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let parent = resolve_post(&state, post_id).await?;
    require_text(&payload.text)?;
    let comment = state
        .repo
        .create_comment(parent.id, user.id, payload.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// update_comment
///
/// [Authenticated Route] Updates a comment the acting user owns. Same shape
/// as update_post: resolve parent, load parent-scoped, gate, persist.
#[utoipa::path(
    patch,
    path = "/v1/posts/{post_id}/comments/{id}",
    params(
        ("post_id" = i64, Path, description = "Parent post ID"),
        ("id" = i64, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 403, description = "Not the Author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((post_id, id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let parent = resolve_post(&state, post_id).await?;
    let existing = state
        .repo
        .get_comment(parent.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    ensure_author(&user, existing.author_id)?;

    if let Some(text) = &payload.text {
        require_text(text)?;
    }

    let updated = state
        .repo
        .update_comment(id, payload.text)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

/// delete_comment
///
/// [Authenticated Route] Removes a comment the acting user owns.
#[utoipa::path(
    delete,
    path = "/v1/posts/{post_id}/comments/{id}",
    params(
        ("post_id" = i64, Path, description = "Parent post ID"),
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the Author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((post_id, id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let parent = resolve_post(&state, post_id).await?;
    let existing = state
        .repo
        .get_comment(parent.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    ensure_author(&user, existing.author_id)?;

    if state.repo.delete_comment(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
