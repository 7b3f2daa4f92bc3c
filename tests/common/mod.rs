#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use customizer_api::auth::{self, Claims};
use customizer_api::config;
use customizer_api::database::models::{LoginUser, NewProduct, ProductRow};
use customizer_api::database::{MemoryProductStore, MemoryUserDirectory, ProductStore};
use customizer_api::otp::{MemoryTtlStore, RecordingMailer};
use customizer_api::AppState;

pub const OWNER_EMAIL: &str = "owner@example.com";
pub const OWNER_PASSWORD: &str = "hunter2";
pub const STORE_HASH: &str = "store1";

/// The full router over in-memory backends
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryProductStore>,
    pub users: Arc<MemoryUserDirectory>,
    pub mailer: Arc<RecordingMailer>,
    pub token: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryProductStore::new());
        let users = Arc::new(MemoryUserDirectory::new());
        let mailer = Arc::new(RecordingMailer::new());

        users.add(owner(true)).await;

        let state = AppState::new(
            store.clone(),
            users.clone(),
            Arc::new(MemoryTtlStore::new()),
            mailer.clone(),
            config::config(),
        );
        let router = customizer_api::app(state, config::config());
        let token = auth::generate_jwt(&Claims::new(1, Some(STORE_HASH.to_string()), "superadmin"))
            .expect("token");

        Self {
            router,
            store,
            users,
            mailer,
            token,
        }
    }

    /// A token for another role and store
    pub fn token_for(&self, role: &str, store_hash: Option<&str>) -> String {
        auth::generate_jwt(&Claims::new(2, store_hash.map(str::to_string), role)).expect("token")
    }

    /// Insert a product directly into the store
    pub async fn product(&self, sku: &str, visible: bool) -> ProductRow {
        self.store
            .insert_product(&NewProduct {
                product_sku: sku.to_string(),
                store_hash: Some(STORE_HASH.to_string()),
                product_name: Some(format!("{} name", sku)),
                product_image: None,
                product_type: None,
                visible,
            })
            .await
            .expect("insert product")
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        self.send(Method::GET, uri, None, Some(&self.token)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, Some(body), Some(&self.token)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PUT, uri, Some(body), Some(&self.token)).await
    }

    pub async fn delete(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::DELETE, uri, Some(body), Some(&self.token)).await
    }

    pub async fn get_public(&self, uri: &str) -> Result<TestResponse> {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post_public(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TestResponse { status, body })
    }
}

pub fn owner(subscription_active: bool) -> LoginUser {
    LoginUser {
        id: 1,
        email: OWNER_EMAIL.to_string(),
        user_name: Some("Owner".to_string()),
        phone: Some("555-0100".to_string()),
        role: Some("superadmin".to_string()),
        store_hash: Some(STORE_HASH.to_string()),
        password_hash: Some(auth::hash_password(OWNER_PASSWORD, 4).expect("bcrypt hash")),
        subscription_active,
    }
}
