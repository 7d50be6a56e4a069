/// Common test utilities and fixtures
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use otakuy_core::{AlbumLifecycle, UserId};
use otakuy_server::{
    create_router,
    services::{AuthService, CoverStorage, DoubanClient, StoreIdentity},
    state::AppState,
};
use otakuy_storage::{users, SqliteAlbumStore};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key";

/// Test user credentials
pub mod fixtures {
    pub const TEST_PASSWORD: &str = "TestPassword123!";
}

/// Create a file-backed test database with migrations applied
pub async fn create_test_database(dir: &TempDir) -> SqlitePool {
    let db_url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = otakuy_storage::create_pool(&db_url)
        .await
        .expect("Failed to create pool");
    otakuy_storage::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub fn create_test_auth_service() -> AuthService {
    AuthService::new(TEST_SECRET.to_string(), 1, 1).expect("Failed to create auth service")
}

/// Full router over a temp database and temp cover directory
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub auth: Arc<AuthService>,
    pub covers: TempDir,
    _db_dir: TempDir,
}

impl TestApp {
    /// App whose metadata client points at `metadata_url`
    pub async fn with_metadata(metadata_url: &str) -> Self {
        let db_dir = TempDir::new().unwrap();
        let covers = TempDir::new().unwrap();
        let pool = create_test_database(&db_dir).await;
        let auth = Arc::new(create_test_auth_service());

        let cover_storage = CoverStorage::new(covers.path().to_path_buf(), "https://cover.test");
        let metadata = DoubanClient::new(metadata_url, Duration::from_secs(2)).unwrap();
        let lifecycle = AlbumLifecycle::new(
            Arc::new(SqliteAlbumStore::new(pool.clone())),
            Arc::new(StoreIdentity::new(pool.clone(), Arc::clone(&auth))),
            Arc::new(cover_storage),
            Arc::new(metadata),
        );

        let state = AppState::new(pool.clone(), Arc::new(lifecycle), Arc::clone(&auth));
        let router = create_router(state, Arc::clone(&auth), covers.path());

        Self {
            router,
            pool,
            auth,
            covers,
            _db_dir: db_dir,
        }
    }

    pub async fn new() -> Self {
        // Nothing listens here; tests that need metadata use a mock server
        Self::with_metadata("http://127.0.0.1:9").await
    }

    /// Create a user and return an access token for it
    pub async fn user(&self, username: &str, star: u32, moderator: bool) -> (UserId, String) {
        let hash = self.auth.hash_password(fixtures::TEST_PASSWORD).unwrap();
        let user = users::create(&self.pool, username, &hash, star, moderator)
            .await
            .unwrap();
        let token = self.auth.create_access_token(&user.id).unwrap();
        (user.id, token)
    }

    /// Send a request and decode the JSON body (Null when empty)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}
