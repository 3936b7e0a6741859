use std::sync::Arc;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{LeadId, LeadQuery, LeadStatus, LeadSubmission, LeadUpdate};
use super::service::{LeadService, LeadServiceError};
use crate::agents::AgentCode;
use crate::error::failure_response;
use crate::notify::LeadNotifier;
use crate::repository::{AgentDirectory, LeadRepository};

/// Router exposing lead intake and the agent-facing lead endpoints.
pub fn lead_router<R, D, N>(service: Arc<LeadService<R, D, N>>) -> Router
where
    R: LeadRepository + 'static,
    D: AgentDirectory + 'static,
    N: LeadNotifier + 'static,
{
    Router::new()
        .route(
            "/api/leads",
            get(list_handler::<R, D, N>).post(create_handler::<R, D, N>),
        )
        .route(
            "/api/leads/:id",
            get(detail_handler::<R, D, N>).put(update_handler::<R, D, N>),
        )
        .with_state(service)
}

/// Lead form body, accepted as JSON or as a url-encoded HTML form post.
#[derive(Debug)]
pub struct LeadPayload(pub LeadSubmission);

#[async_trait]
impl<S> FromRequest<S> for LeadPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| {
                value.starts_with("application/x-www-form-urlencoded")
            });

        if is_form {
            Form::<LeadSubmission>::from_request(req, state)
                .await
                .map(|Form(submission)| Self(submission))
                .map_err(|rejection| {
                    failure_response(StatusCode::BAD_REQUEST, rejection.body_text())
                })
        } else {
            Json::<LeadSubmission>::from_request(req, state)
                .await
                .map(|Json(submission)| Self(submission))
                .map_err(|rejection| {
                    failure_response(StatusCode::BAD_REQUEST, rejection.body_text())
                })
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateParams {
    #[serde(default)]
    agent_id: Option<String>,
}

/// Raw listing parameters; parsed into a [`LeadQuery`] so bad input yields a JSON 400.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    #[serde(default)]
    agent_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    min_score: Option<String>,
}

impl ListParams {
    fn into_query(self) -> Result<LeadQuery, String> {
        let min_score = match present(self.min_score) {
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| format!("min_score must be an integer, got '{raw}'"))?,
            ),
            None => None,
        };

        Ok(LeadQuery {
            agent: present(self.agent_id).map(AgentCode),
            status: present(self.status).map(LeadStatus::from),
            min_score,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

pub(crate) async fn create_handler<R, D, N>(
    State(service): State<Arc<LeadService<R, D, N>>>,
    Query(params): Query<CreateParams>,
    LeadPayload(submission): LeadPayload,
) -> Response
where
    R: LeadRepository + 'static,
    D: AgentDirectory + 'static,
    N: LeadNotifier + 'static,
{
    match service.create(submission, params.agent_id).await {
        Ok(created) => {
            let payload = json!({
                "success": true,
                "message": "Lead created successfully",
                "lead": created.lead.receipt(),
                "agent": {
                    "name": created.agent.name,
                    "email": created.agent.email,
                },
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(error) => lead_failure(error),
    }
}

pub(crate) async fn list_handler<R, D, N>(
    State(service): State<Arc<LeadService<R, D, N>>>,
    Query(params): Query<ListParams>,
) -> Response
where
    R: LeadRepository + 'static,
    D: AgentDirectory + 'static,
    N: LeadNotifier + 'static,
{
    let query = match params.into_query() {
        Ok(query) => query,
        Err(message) => return failure_response(StatusCode::BAD_REQUEST, message),
    };

    match service.list(query).await {
        Ok(leads) => {
            let payload = json!({
                "success": true,
                "count": leads.len(),
                "leads": leads,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => lead_failure(error),
    }
}

pub(crate) async fn detail_handler<R, D, N>(
    State(service): State<Arc<LeadService<R, D, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
    D: AgentDirectory + 'static,
    N: LeadNotifier + 'static,
{
    match service.get(&LeadId(id)).await {
        Ok(lead) => {
            let payload = json!({ "success": true, "lead": lead });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => lead_failure(error),
    }
}

pub(crate) async fn update_handler<R, D, N>(
    State(service): State<Arc<LeadService<R, D, N>>>,
    Path(id): Path<String>,
    payload: Result<Json<LeadUpdate>, JsonRejection>,
) -> Response
where
    R: LeadRepository + 'static,
    D: AgentDirectory + 'static,
    N: LeadNotifier + 'static,
{
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.update(&LeadId(id), update).await {
        Ok(lead) => {
            let payload = json!({
                "success": true,
                "message": "Lead updated successfully",
                "lead": lead,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => lead_failure(error),
    }
}

fn lead_failure(error: LeadServiceError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(error = %error, "lead request failed");
    }
    failure_response(status, error.public_message())
}
