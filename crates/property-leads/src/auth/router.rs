use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::error::AuthError;
use super::service::{AuthService, LoginRequest};
use crate::error::failure_response;
use crate::repository::AgentDirectory;

/// Router exposing the login and session verification endpoints.
pub fn auth_router<D>(service: Arc<AuthService<D>>) -> Router
where
    D: AgentDirectory + 'static,
{
    Router::new()
        .route("/api/auth/login", post(login_handler::<D>))
        .route("/api/auth/verify", get(verify_handler::<D>))
        .with_state(service)
}

pub(crate) async fn login_handler<D>(
    State(service): State<Arc<AuthService<D>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response
where
    D: AgentDirectory + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.login(request).await {
        Ok(output) => {
            let payload = json!({
                "success": true,
                "message": "Login successful",
                "token": output.token,
                "agent": output.agent,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => auth_failure(error),
    }
}

pub(crate) async fn verify_handler<D>(
    State(service): State<Arc<AuthService<D>>>,
    headers: HeaderMap,
) -> Response
where
    D: AgentDirectory + 'static,
{
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match service.verify(authorization).await {
        Ok(agent) => {
            let payload = json!({ "success": true, "agent": agent });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => auth_failure(error),
    }
}

fn auth_failure(error: AuthError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(error = %error, "authentication request failed");
    }
    failure_response(status, error.public_message())
}
