use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use pulseboard::{
    AppState,
    auth::{AuthUser, ensure_author},
    config::{AppConfig, Env},
    error::ApiError,
    models::{Comment, CreatePostRequest, Group, Post, UpdatePostRequest, User},
    repository::Repository,
};
use std::sync::Arc;

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    // The user resolved by id lookups (local bypass path).
    user_by_id: Option<User>,
    // The token the store recognizes, and who it belongs to.
    known_token: Option<(String, User)>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn get_user(&self, _id: i64) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_by_id.clone())
    }
    async fn get_user_by_username(&self, _username: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(None)
    }
    async fn get_user_by_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .known_token
            .as_ref()
            .filter(|(t, _)| t == token)
            .map(|(_, u)| u.clone()))
    }
    async fn get_or_create_token(
        &self,
        _user_id: i64,
        candidate: &str,
    ) -> Result<String, sqlx::Error> {
        Ok(candidate.to_string())
    }

    // Placeholders; the auth path never touches content.
    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error> {
        Ok(vec![])
    }
    async fn get_post(&self, _id: i64) -> Result<Option<Post>, sqlx::Error> {
        Ok(None)
    }
    async fn create_post(
        &self,
        _author_id: i64,
        _req: CreatePostRequest,
    ) -> Result<Post, sqlx::Error> {
        Ok(Post::default())
    }
    async fn update_post(
        &self,
        _id: i64,
        _req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        Ok(None)
    }
    async fn delete_post(&self, _id: i64) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
    async fn list_groups(&self) -> Result<Vec<Group>, sqlx::Error> {
        Ok(vec![])
    }
    async fn get_group(&self, _id: i64) -> Result<Option<Group>, sqlx::Error> {
        Ok(None)
    }
    async fn list_comments(&self, _post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
        Ok(vec![])
    }
    async fn get_comment(&self, _post_id: i64, _id: i64) -> Result<Option<Comment>, sqlx::Error> {
        Ok(None)
    }
    async fn create_comment(
        &self,
        _post_id: i64,
        _author_id: i64,
        _text: String,
    ) -> Result<Comment, sqlx::Error> {
        Ok(Comment::default())
    }
    async fn update_comment(
        &self,
        _id: i64,
        _text: Option<String>,
    ) -> Result<Option<Comment>, sqlx::Error> {
        Ok(None)
    }
    async fn delete_comment(&self, _id: i64) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
}

// --- Helper Functions ---

const TEST_USER_ID: i64 = 1;

fn test_user() -> User {
    User {
        id: TEST_USER_ID,
        username: "alice".to_string(),
        password_hash: String::new(),
    }
}

fn create_app_state(env: Env, repo: MockAuthRepo) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    AppState {
        repo: Arc::new(repo),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request.
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Extractor Tests ---

#[tokio::test]
async fn auth_success_with_known_token() {
    let mock_repo = MockAuthRepo {
        known_token: Some(("cafebabe".to_string(), test_user())),
        ..MockAuthRepo::default()
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Bearer cafebabe"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn auth_failure_with_missing_header() {
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), ApiError::Unauthenticated);
}

#[tokio::test]
async fn auth_failure_with_unknown_token() {
    let mock_repo = MockAuthRepo {
        known_token: Some(("cafebabe".to_string(), test_user())),
        ..MockAuthRepo::default()
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Bearer deadbeef"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), ApiError::Unauthenticated);
}

#[tokio::test]
async fn auth_failure_with_non_bearer_scheme() {
    let mock_repo = MockAuthRepo {
        known_token: Some(("cafebabe".to_string(), test_user())),
        ..MockAuthRepo::default()
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Basic cafebabe"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), ApiError::Unauthenticated);
}

#[tokio::test]
async fn local_bypass_success() {
    let mock_repo = MockAuthRepo {
        user_by_id: Some(test_user()),
        ..MockAuthRepo::default()
    };
    let app_state = create_app_state(Env::Local, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&TEST_USER_ID.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap().id, TEST_USER_ID);
}

#[tokio::test]
async fn local_bypass_disabled_in_prod() {
    let mock_repo = MockAuthRepo {
        user_by_id: Some(test_user()),
        ..MockAuthRepo::default()
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header.
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&TEST_USER_ID.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(auth_user.unwrap_err(), ApiError::Unauthenticated);
}

// --- Ownership Gate Tests ---

#[test]
fn ensure_author_allows_the_author() {
    let user = AuthUser {
        id: TEST_USER_ID,
        username: "alice".to_string(),
    };
    assert!(ensure_author(&user, TEST_USER_ID).is_ok());
}

#[test]
fn ensure_author_rejects_everyone_else() {
    let user = AuthUser {
        id: TEST_USER_ID,
        username: "alice".to_string(),
    };
    assert_eq!(
        ensure_author(&user, TEST_USER_ID + 1).unwrap_err(),
        ApiError::PermissionDenied
    );
}
