#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use handbook_server::{
    auth::ensure_admin,
    config::{Config, PagesBackend},
    db::create_memory_pool,
    routes::{create_router, AppState},
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "s3cret-pass";
pub const MAX_UPLOAD_BYTES: usize = 1024;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new(backend: PagesBackend) -> Self {
        Self::with_config(backend, |_| {}).await
    }

    pub async fn with_config(backend: PagesBackend, customize: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let mut config = Config::from_lookup(|_| None).unwrap();
        config.pages_backend = backend;
        config.pages_file = dir.path().join("pages.json");
        config.uploads_dir = dir.path().join("uploads");
        config.max_upload_bytes = MAX_UPLOAD_BYTES;
        config.admin_username = Some(ADMIN_USERNAME.to_string());
        config.admin_password = Some(ADMIN_PASSWORD.to_string());
        customize(&mut config);

        let db = create_memory_pool().await.unwrap();
        ensure_admin(&db, &config).await.unwrap();

        let state = AppState::new(db, config);
        let router = create_router(state.clone());

        Self { router, state, dir }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn login(&self) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/admin/login",
                None,
                Some(json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Creates a node through the admin API and returns its id.
    pub async fn create(&self, token: &str, body: Value) -> String {
        let (status, response) = self
            .request(Method::POST, "/api/admin/pages", Some(token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", response);
        response["page_id"].as_str().unwrap().to_string()
    }

    pub async fn publish(&self, token: &str, id: &str) {
        let (status, _) = self
            .request(
                Method::PUT,
                &format!("/api/admin/pages/{}/visibility", id),
                Some(token),
                Some(json!({"published": true})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}
