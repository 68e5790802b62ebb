//! Fixed-response endpoints kept for dashboard compatibility. None of them
//! touch the dataset.

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use super::state::ServerState;
use crate::dataset::round_to;

const CLEANUP_ACTIONS: [&str; 4] = [
    "Removed unused storage containers",
    "Deleted temporary compute instances",
    "Cleaned up old log files",
    "Released unused IP addresses",
];

#[derive(Serialize)]
struct SecurityFlags {
    encryption: &'static str,
    access_control: &'static str,
    compliance: &'static str,
}

#[derive(Serialize)]
struct SecurityStatusResponse {
    status: &'static str,
    security: SecurityFlags,
}

#[derive(Serialize)]
struct VerifyResponse {
    status: &'static str,
    message: &'static str,
    verified: bool,
}

#[derive(Serialize, Debug)]
struct ResourcesFreed {
    storage_gb: f64,
    compute_instances: u32,
    actions: Vec<&'static str>,
}

#[derive(Serialize)]
struct CleanupResponse {
    status: &'static str,
    message: &'static str,
    resources_freed: ResourcesFreed,
}

async fn security_status() -> Json<SecurityStatusResponse> {
    Json(SecurityStatusResponse {
        status: "success",
        security: SecurityFlags {
            encryption: "Enabled",
            access_control: "Secure",
            compliance: "GDPR Compliant",
        },
    })
}

fn is_valid_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

async fn verify_2fa(body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": format!("Invalid request body: {}", e) })),
            )
                .into_response()
        }
    };

    let code = payload.get("code").and_then(Value::as_str).unwrap_or("");
    if is_valid_code(code) {
        Json(VerifyResponse {
            status: "success",
            message: "2FA verification successful",
            verified: true,
        })
        .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(VerifyResponse {
                status: "error",
                message: "Invalid 2FA code",
                verified: false,
            }),
        )
            .into_response()
    }
}

fn simulate_cleanup() -> ResourcesFreed {
    let mut rng = rand::rng();
    ResourcesFreed {
        storage_gb: round_to(rng.random_range(1.5..3.5), 1),
        compute_instances: rng.random_range(2..=5),
        actions: CLEANUP_ACTIONS.to_vec(),
    }
}

async fn cloud_cleanup() -> Json<CleanupResponse> {
    Json(CleanupResponse {
        status: "success",
        message: "Cloud resource cleanup completed",
        resources_freed: simulate_cleanup(),
    })
}

pub fn make_stub_routes() -> Router<ServerState> {
    Router::new()
        .route("/security/status", get(security_status))
        .route("/auth/2fa/verify", post(verify_2fa))
        .route("/cloud/cleanup", post(cloud_cleanup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_six_ascii_digits() {
        assert!(is_valid_code("123456"));
        assert!(is_valid_code("000000"));
        assert!(!is_valid_code("12345"));
        assert!(!is_valid_code("1234567"));
        assert!(!is_valid_code("12a456"));
        assert!(!is_valid_code("１２３４５６"));
        assert!(!is_valid_code(""));
    }

    #[test]
    fn cleanup_numbers_stay_in_range() {
        for _ in 0..200 {
            let freed = simulate_cleanup();
            assert!((1.5..=3.5).contains(&freed.storage_gb), "{:?}", freed);
            assert!((2..=5).contains(&freed.compute_instances), "{:?}", freed);
            assert_eq!(freed.actions.len(), 4);
        }
    }
}
