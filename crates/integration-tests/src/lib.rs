//! Integration tests for Copperline.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL, run migrations, start the server
//! cargo run -p copperline-cli -- migrate
//! cargo run -p copperline-server
//!
//! # Run integration tests against it
//! cargo test -p copperline-integration-tests -- --ignored
//! ```
//!
//! Each test registers its own throwaway user, so tests are independent
//! and repeatable against the same database.

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("COPPERLINE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A logged-in API client bound to a fresh throwaway account.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub email: String,
}

impl TestContext {
    /// Register a fresh user and keep its session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable or registration fails - these
    /// tests assume a running server (see module docs).
    #[allow(clippy::unwrap_used)]
    pub async fn signed_up() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");
        let base_url = base_url();
        let email = format!("it-{}@example.com", uuid::Uuid::new_v4());

        let resp = client
            .post(format!("{base_url}/auth/register"))
            .json(&json!({ "email": email, "password": "integration-test-pw" }))
            .send()
            .await
            .expect("Failed to register test user");
        assert!(
            resp.status().is_success(),
            "registration failed: {}",
            resp.status()
        );

        Self {
            client,
            base_url,
            email,
        }
    }

    /// POST a JSON body and return the parsed response with its status.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    #[allow(clippy::unwrap_used)]
    pub async fn post(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .expect("request failed");
        let status = resp.status();
        (status, resp.json().await.expect("non-JSON response"))
    }

    /// GET and return the parsed response with its status.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    #[allow(clippy::unwrap_used)]
    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("request failed");
        let status = resp.status();
        (status, resp.json().await.expect("non-JSON response"))
    }

    /// PUT a JSON body and return the parsed response with its status.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    #[allow(clippy::unwrap_used)]
    pub async fn put(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .expect("request failed");
        let status = resp.status();
        (status, resp.json().await.expect("non-JSON response"))
    }

    /// DELETE and return the parsed response with its status.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    #[allow(clippy::unwrap_used)]
    pub async fn delete(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("request failed");
        let status = resp.status();
        (status, resp.json().await.expect("non-JSON response"))
    }
}
