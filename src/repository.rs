use crate::models::{Comment, CreatePostRequest, Group, Post, UpdatePostRequest, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Repository Trait
///
/// The abstract contract for all persistence operations, letting handlers
/// talk to the data layer without knowing the implementation (Postgres in
/// production, hand-rolled mocks in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
///
/// All methods return `Result` so database failures propagate to the
/// handlers, where `From<sqlx::Error>` turns them into API errors.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users & Tokens ---
    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    // Resolves an opaque bearer token to its user. None means the token is unknown.
    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>, sqlx::Error>;
    // Inserts `candidate` as the user's token unless one already exists;
    // returns whichever token ends up stored. One persistent token per user.
    async fn get_or_create_token(&self, user_id: i64, candidate: &str)
    -> Result<String, sqlx::Error>;

    // --- Posts ---
    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error>;
    async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, sqlx::Error>;
    // Partial update via COALESCE; only provided fields change. Ownership is
    // checked by the handler before this is called.
    async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error>;
    // Returns true if a row was actually removed.
    async fn delete_post(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Groups (read-only surface) ---
    async fn list_groups(&self) -> Result<Vec<Group>, sqlx::Error>;
    async fn get_group(&self, id: i64) -> Result<Option<Group>, sqlx::Error>;

    // --- Comments ---
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, sqlx::Error>;
    // Parent-scoped lookup: a comment id that exists under a different post
    // resolves to None.
    async fn get_comment(&self, post_id: i64, id: i64) -> Result<Option<Comment>, sqlx::Error>;
    async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        text: String,
    ) -> Result<Comment, sqlx::Error>;
    async fn update_comment(
        &self,
        id: i64,
        text: Option<String>,
    ) -> Result<Option<Comment>, sqlx::Error>;
    async fn delete_comment(&self, id: i64) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by Postgres.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Shared SELECT shape for post rows. Every post query joins `users` so the
// wire model can carry the author's username alongside the raw FK.
const POST_COLUMNS: &str = r#"p.id, p.author_id, u.username AS author, p.text, p.pub_date, p.image, p.group_id AS "group""#;

const COMMENT_COLUMNS: &str =
    r#"c.id, c.author_id, u.username AS author, c.text, c.post_id AS post, c.created"#;

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// get_user_by_token
    ///
    /// The core of bearer authentication: one indexed join from the token
    /// table to the user record.
    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.password_hash
            FROM auth_tokens t
            JOIN users u ON t.user_id = u.id
            WHERE t.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
    }

    /// get_or_create_token
    ///
    /// Single-query get-or-create keyed on the per-user uniqueness
    /// constraint. On conflict the stored token wins and is returned, so
    /// concurrent first logins still agree on one token.
    async fn get_or_create_token(
        &self,
        user_id: i64,
        candidate: &str,
    ) -> Result<String, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO auth_tokens (user_id, token) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET token = auth_tokens.token
            RETURNING token
            "#,
        )
        .bind(user_id)
        .bind(candidate)
        .fetch_one(&self.pool)
        .await
    }

    // --- POSTS ---

    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON p.author_id = u.id ORDER BY p.pub_date DESC"
        );
        sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON p.author_id = u.id WHERE p.id = $1"
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// create_post
    ///
    /// Inserts and immediately joins with `users` in one round trip (CTE), so
    /// the returned record already carries the author's username.
    async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, sqlx::Error> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (author_id, text, image, group_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, author_id, text, pub_date, image, group_id
            )
            SELECT {POST_COLUMNS} FROM p JOIN users u ON p.author_id = u.id
            "#
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(author_id)
            .bind(req.text)
            .bind(req.image)
            .bind(req.group)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET text = COALESCE($2, text),
                    image = COALESCE($3, image),
                    group_id = COALESCE($4, group_id)
                WHERE id = $1
                RETURNING id, author_id, text, pub_date, image, group_id
            )
            SELECT {POST_COLUMNS} FROM p JOIN users u ON p.author_id = u.id
            "#
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(req.text)
            .bind(req.image)
            .bind(req.group)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- GROUPS ---

    async fn list_groups(&self) -> Result<Vec<Group>, sqlx::Error> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_group(&self, id: i64) -> Result<Option<Group>, sqlx::Error> {
        sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    // --- COMMENTS ---

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON c.author_id = u.id WHERE c.post_id = $1 ORDER BY c.created ASC"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_comment(&self, post_id: i64, id: i64) -> Result<Option<Comment>, sqlx::Error> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON c.author_id = u.id WHERE c.id = $1 AND c.post_id = $2"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        text: String,
    ) -> Result<Comment, sqlx::Error> {
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO comments (post_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, author_id, post_id, text, created
            )
            SELECT {COMMENT_COLUMNS} FROM c JOIN users u ON c.author_id = u.id
            "#
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .bind(author_id)
            .bind(text)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_comment(
        &self,
        id: i64,
        text: Option<String>,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let sql = format!(
            r#"
            WITH c AS (
                UPDATE comments SET text = COALESCE($2, text)
                WHERE id = $1
                RETURNING id, author_id, post_id, text, created
            )
            SELECT {COMMENT_COLUMNS} FROM c JOIN users u ON c.author_id = u.id
            "#
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(text)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
