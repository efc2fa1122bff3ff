use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use domain::services::PushService;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{alerts, health, network, reports, vigilance};
use crate::services::{AbuseEngine, AlertEngine, Classifier, FcmPush, VigilanceEngine};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub alert_engine: AlertEngine,
    pub vigilance_engine: VigilanceEngine,
    pub abuse_engine: AbuseEngine,
    pub classifier: Option<Classifier>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let push: Option<Arc<dyn PushService>> = if config.fcm.enabled {
        match FcmPush::new(config.fcm.clone()) {
            Ok(fcm) => Some(Arc::new(fcm)),
            Err(e) => {
                warn!("FCM transport unavailable, deliveries will fail: {}", e);
                None
            }
        }
    } else {
        None
    };

    let classifier = if config.classifier.enabled {
        match Classifier::new(pool.clone(), config.classifier.clone()) {
            Ok(classifier) => Some(classifier),
            Err(e) => {
                warn!("Classifier client unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let alert_engine = AlertEngine::new(pool.clone(), config.routing.clone(), push);
    let vigilance_engine = VigilanceEngine::new(pool.clone(), alert_engine.clone());
    let abuse_engine = AbuseEngine::new(pool.clone());

    let state = AppState {
        pool,
        config: config.clone(),
        alert_engine,
        vigilance_engine,
        abuse_engine,
        classifier,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        .route("/api/v1/alertas", post(alerts::submit_alert))
        .route("/api/v1/alertas/clasificar", post(alerts::classify_alert))
        .route("/api/v1/alertas/responder", post(alerts::respond_to_alert))
        .route("/api/v1/alertas/:alerta_id", get(alerts::get_alert))
        .route(
            "/api/v1/alertas/:alerta_id/respuestas",
            get(alerts::get_alert_responses),
        )
        .route("/api/v1/vigilancias", post(vigilance::create_vigilance))
        .route(
            "/api/v1/vigilancias/confirmar",
            post(vigilance::confirm_vigilance),
        )
        .route("/api/v1/reportes", post(reports::report_person))
        .route("/api/v1/red/ubicacion", post(network::upsert_location))
        .route("/api/v1/red/token", post(network::register_token));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
