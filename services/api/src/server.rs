use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use property_leads::auth::AuthService;
use property_leads::config::AppConfig;
use property_leads::error::AppError;
use property_leads::leads::LeadService;
use property_leads::notify::Mailer;
use property_leads::store::PostgrestStore;
use property_leads::telemetry;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState::new(prometheus_handle);

    let store = Arc::new(PostgrestStore::new(&config.store)?);
    let mailer = Arc::new(Mailer::from_config(config.mail.as_ref())?);
    if mailer.is_enabled() {
        let probe = Arc::clone(&mailer);
        tokio::spawn(async move {
            if let Mailer::Smtp(smtp) = probe.as_ref() {
                smtp.verify_connection().await;
            }
        });
    } else {
        info!("EMAIL_USER/EMAIL_PASS not set; new lead alerts will only be logged");
    }

    let auth_service = Arc::new(AuthService::new(store.clone(), &config.auth));
    let lead_service = Arc::new(LeadService::new(store.clone(), store.clone(), mailer));

    let app = with_application_routes(
        auth_service,
        lead_service,
        store,
        config.server.static_dir.as_deref(),
    )
    .layer(Extension(app_state.clone()))
    .layer(prometheus_layer)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    app_state.mark_ready();

    info!(?config.environment, %addr, "property lead service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
