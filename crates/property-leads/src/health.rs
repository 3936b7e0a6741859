use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use crate::repository::AgentDirectory;

/// `GET /health`: reports whether the store answers a trivial query.
pub fn health_router<D>(directory: Arc<D>) -> Router
where
    D: AgentDirectory + 'static,
{
    Router::new()
        .route("/health", get(health_handler::<D>))
        .with_state(directory)
}

pub(crate) async fn health_handler<D>(State(directory): State<Arc<D>>) -> Response
where
    D: AgentDirectory + 'static,
{
    match directory.ping().await {
        Ok(()) => {
            let payload = json!({
                "status": "healthy",
                "database": "connected",
                "timestamp": Utc::now().to_rfc3339(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => {
            tracing::error!(error = %error, "health check failed");
            let payload = json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentCode, AgentId, AgentRecord};
    use crate::repository::RepositoryError;
    use crate::store::MemoryStore;

    struct OfflineDirectory;

    impl AgentDirectory for OfflineDirectory {
        async fn find_by_email(&self, _: &str) -> Result<Option<AgentRecord>, RepositoryError> {
            Ok(None)
        }

        async fn find_by_id(&self, _: &AgentId) -> Result<Option<AgentRecord>, RepositoryError> {
            Ok(None)
        }

        async fn find_by_code(&self, _: &AgentCode) -> Result<Option<AgentRecord>, RepositoryError> {
            Ok(None)
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }
    }

    async fn body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn reports_healthy_store() {
        let response = health_handler(State(Arc::new(MemoryStore::new()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["database"], "connected");
    }

    #[tokio::test]
    async fn reports_unreachable_store() {
        let response = health_handler(State(Arc::new(OfflineDirectory))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let payload = body(response).await;
        assert_eq!(payload["status"], "unhealthy");
        assert_eq!(payload["database"], "disconnected");
        assert_eq!(payload["error"], "store unavailable: connection refused");
    }
}
