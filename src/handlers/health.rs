use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::AppState;
use crate::config::validate_storage;

const SERVICE_NAME: &str = "change-order-generator";

/// Service status and endpoint listing
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "online",
        "message": "Change Order API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "ready": "/ready",
            "metrics": "/metrics",
            "generate_from_pdf": "/generate-from-pdf",
            "generate_from_text": "/generate-from-text",
        }
    }))
}

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 503 until an LLM key and a usable storage backend are configured
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config.load();
    let llm_configured = !config.llm.api_key.trim().is_empty();
    let storage_configured = validate_storage(&config.storage).is_ok();

    let ready = llm_configured && storage_configured;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(json!({
        "status": if ready { "ready" } else { "not_ready" },
        "service": SERVICE_NAME,
        "checks": {
            "llm_configured": llm_configured,
            "storage_configured": storage_configured,
            "storage_backend": config.storage.backend.to_string(),
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, StorageBackend};
    use arc_swap::ArcSwap;
    use std::sync::Arc;

    fn state_with(config: Config) -> AppState {
        AppState::new(Arc::new(ArcSwap::from_pointee(config)))
    }

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_returns_ok() {
        let response = root().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_requires_api_key() {
        let response = readiness_check(State(state_with(Config::default())))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_readiness_with_local_storage() {
        let mut config = Config::default();
        config.llm.api_key = "sk-test".to_string();
        config.storage.backend = StorageBackend::Local;

        let response = readiness_check(State(state_with(config))).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_requires_gcs_access_token() {
        let mut config = Config::default();
        config.llm.api_key = "sk-test".to_string();
        config.storage.bucket = "change-orders".to_string();

        let response = readiness_check(State(state_with(config.clone())))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        config.storage.access_token = "ya29.token".to_string();
        let response = readiness_check(State(state_with(config))).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
