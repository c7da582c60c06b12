//! Shared harness for router-level tests
//!
//! Every test gets its own in-memory database and temp directory, and drives
//! the full router with `oneshot`.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use hostel_hub::{config::ServerConfig, context::AppContext, db, server};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub ctx: AppContext,
    pub router: Router,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config =
            ServerConfig::for_testing(dir.path().to_path_buf(), ADMIN_PASSWORD).expect("config");
        let pool = db::memory_pool().await.expect("pool");
        let ctx = AppContext::from_pool(config, pool);
        let router = server::build_router(ctx.clone());

        Self {
            ctx,
            router,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    pub async fn get(&self, uri: &str, auth: Auth<'_>) -> TestResponse {
        self.send(request(Method::GET, uri, auth, None)).await
    }

    pub async fn post(&self, uri: &str, auth: Auth<'_>, body: Value) -> TestResponse {
        self.send(request(Method::POST, uri, auth, Some(body))).await
    }

    pub async fn put(&self, uri: &str, auth: Auth<'_>, body: Value) -> TestResponse {
        self.send(request(Method::PUT, uri, auth, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, auth: Auth<'_>) -> TestResponse {
        self.send(request(Method::DELETE, uri, auth, None)).await
    }

    /// Register an account and return `(user id, bearer token)`
    pub async fn register(&self, email: &str, role: &str) -> (String, String) {
        let res = self
            .post(
                "/api/auth/register",
                Auth::None,
                json!({
                    "email": email,
                    "password": "password123",
                    "fullName": "Test Person",
                    "phone": "+2348000000000",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register: {}", res.body);

        let data = &res.body["data"];
        (
            data["user"]["id"].as_str().expect("id").to_string(),
            data["token"].as_str().expect("token").to_string(),
        )
    }

    /// Log the admin in and return the raw cookie value
    pub async fn admin_cookie(&self) -> String {
        let res = self
            .post(
                "/api/admin/login",
                Auth::None,
                json!({ "username": "admin", "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "admin login: {}", res.body);

        let header = res.set_cookie.expect("Set-Cookie on login");
        cookie_value(&header).to_string()
    }

    /// Register an agent and approve them through the admin API
    pub async fn verified_agent(&self, email: &str, admin: &str) -> (String, String) {
        let (id, token) = self.register(email, "agent").await;
        let res = self
            .post(
                "/api/admin/verify-agent",
                Auth::Admin(admin),
                json!({ "agentId": id, "action": "approve" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "approve: {}", res.body);
        (id, token)
    }
}

/// Credentials attached to a request
#[derive(Clone, Copy)]
pub enum Auth<'a> {
    None,
    Bearer(&'a str),
    Admin(&'a str),
}

pub fn request(method: Method, uri: &str, auth: Auth<'_>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    builder = match auth {
        Auth::None => builder,
        Auth::Bearer(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        Auth::Admin(cookie) => builder.header(header::COOKIE, format!("admin-session={}", cookie)),
    };

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// `admin-session=<value>; Path=...` -> `<value>`
pub fn cookie_value(set_cookie: &str) -> &str {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value)
        .unwrap_or("")
}
