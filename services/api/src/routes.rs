use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use property_leads::auth::{auth_router, AuthService};
use property_leads::health::health_router;
use property_leads::leads::{lead_router, LeadService};
use property_leads::notify::LeadNotifier;
use property_leads::repository::{AgentDirectory, LeadRepository};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

/// Page served at `/` when static assets are enabled.
const LANDING_PAGE: &str = "dashboard/login.html";

/// Merge the domain routers with the operational endpoints and optional static assets.
pub(crate) fn with_application_routes<R, D, N>(
    auth: Arc<AuthService<D>>,
    leads: Arc<LeadService<R, D, N>>,
    directory: Arc<D>,
    static_dir: Option<&Path>,
) -> Router
where
    R: LeadRepository + 'static,
    D: AgentDirectory + 'static,
    N: LeadNotifier + 'static,
{
    let router = auth_router(auth)
        .merge(lead_router(leads))
        .merge(health_router(directory))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint));

    match static_dir {
        Some(root) => router
            .route_service("/", ServeFile::new(root.join(LANDING_PAGE)))
            .fallback_service(ServeDir::new(root)),
        None => router,
    }
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use property_leads::config::AuthConfig;
    use property_leads::notify::Mailer;
    use property_leads::store::MemoryStore;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(PrometheusBuilder::new().build_recorder().handle())
    }

    fn router(static_dir: Option<&Path>, state: AppState) -> Router {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(AuthService::new(
            store.clone(),
            &AuthConfig {
                jwt_secret: "routes-secret".to_string(),
                token_ttl: Duration::from_secs(3600),
            },
        ));
        let leads = Arc::new(LeadService::new(
            store.clone(),
            store.clone(),
            Arc::new(Mailer::Disabled),
        ));
        with_application_routes(auth, leads, store, static_dir).layer(Extension(state))
    }

    async fn get_status(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("route executes")
            .status()
    }

    #[tokio::test]
    async fn readiness_flips_once_marked_ready() {
        let state = state();
        assert_eq!(
            get_status(router(None, state.clone()), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        state.mark_ready();
        assert_eq!(
            get_status(router(None, state), "/ready").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn merged_router_serves_domain_and_operational_routes() {
        let state = state();
        assert_eq!(
            get_status(router(None, state.clone()), "/health").await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(router(None, state.clone()), "/metrics").await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(router(None, state.clone()), "/api/leads").await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(router(None, state), "/api/auth/verify").await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn static_assets_are_served_when_configured() {
        let root = std::env::temp_dir().join(format!("property-leads-static-{}", std::process::id()));
        std::fs::create_dir_all(root.join("dashboard")).expect("create static dir");
        std::fs::write(root.join(LANDING_PAGE), "<h1>Agent login</h1>").expect("write page");

        let landing = router(Some(&root), state())
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(landing.status(), StatusCode::OK);
        let body = axum::body::to_bytes(landing.into_body(), 1024)
            .await
            .expect("read body");
        assert_eq!(&body[..], b"<h1>Agent login</h1>");

        assert_eq!(
            get_status(router(Some(&root), state()), "/dashboard/login.html").await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(router(Some(&root), state()), "/missing.css").await,
            StatusCode::NOT_FOUND
        );

        let _ = std::fs::remove_dir_all(&root);
    }
}
