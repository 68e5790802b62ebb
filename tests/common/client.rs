//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all API endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Dataset Endpoints
    // ========================================================================

    /// GET /api/health
    pub async fn health(&self) -> Response {
        self.get("/health", &[]).await
    }

    /// GET /api/nutrition/summary
    pub async fn nutrition_summary(&self) -> Response {
        self.get("/nutrition/summary", &[]).await
    }

    /// GET /api/recipes/top-protein
    pub async fn top_protein(&self, limit: Option<&str>) -> Response {
        let query: Vec<(&str, &str)> = limit.map(|l| ("limit", l)).into_iter().collect();
        self.get("/recipes/top-protein", &query).await
    }

    /// GET /api/recipes
    pub async fn recipes(&self, diet_type: Option<&str>, limit: Option<&str>) -> Response {
        let mut query = Vec::new();
        if let Some(diet_type) = diet_type {
            query.push(("diet_type", diet_type));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        self.get("/recipes", &query).await
    }

    /// GET /api/clusters
    pub async fn clusters(&self) -> Response {
        self.get("/clusters", &[]).await
    }

    /// GET /api/nutrition/all
    pub async fn all_data(&self, page: Option<&str>, per_page: Option<&str>) -> Response {
        let mut query = Vec::new();
        if let Some(page) = page {
            query.push(("page", page));
        }
        if let Some(per_page) = per_page {
            query.push(("per_page", per_page));
        }
        self.get("/nutrition/all", &query).await
    }

    // ========================================================================
    // Fixed-response Endpoints
    // ========================================================================

    /// GET /api/security/status
    pub async fn security_status(&self) -> Response {
        self.get("/security/status", &[]).await
    }

    /// POST /api/auth/2fa/verify with a JSON body
    pub async fn verify_2fa(&self, body: &Value) -> Response {
        self.client
            .post(self.url("/auth/2fa/verify"))
            .json(body)
            .send()
            .await
            .expect("Verify 2FA request failed")
    }

    /// POST /api/auth/2fa/verify with an arbitrary body
    pub async fn verify_2fa_raw(&self, body: &str) -> Response {
        self.client
            .post(self.url("/auth/2fa/verify"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await
            .expect("Verify 2FA request failed")
    }

    /// POST /api/cloud/cleanup
    pub async fn cloud_cleanup(&self) -> Response {
        self.client
            .post(self.url("/cloud/cleanup"))
            .send()
            .await
            .expect("Cleanup request failed")
    }
}
