use axum::{middleware, routing::get, Router};
use domain::models::UserDetails;
use domain::services::{
    QueryExecutor, ReportDefinitionStore, StubUserDirectory, TrackingRecorder, UserDirectory,
};
use domain::DirectoryError;
use persistence::repositories::{
    PgQueryExecutor, ReportDefinitionRepository, ReportTrackingRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{Config, DirectoryConfig};
use crate::middleware::{
    metrics_handler, metrics_middleware, require_user, security_headers_middleware, trace_id,
};
use crate::routes::{health, reports};
use crate::services::{GraphUserDirectory, ReportExportService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub reports: Arc<ReportExportService>,
    pub directory: Arc<dyn UserDirectory>,
}

/// Collaborators the HTTP layer runs against.
pub struct AppServices {
    pub definitions: Arc<dyn ReportDefinitionStore>,
    pub executor: Arc<dyn QueryExecutor>,
    pub tracking: Arc<dyn TrackingRecorder>,
    pub directory: Arc<dyn UserDirectory>,
}

impl AppServices {
    /// Postgres-backed collaborators plus the configured user directory.
    pub fn postgres(config: &Config, pool: &PgPool) -> Result<Self, DirectoryError> {
        Ok(Self {
            definitions: Arc::new(ReportDefinitionRepository::new(pool.clone())),
            executor: Arc::new(PgQueryExecutor::new(
                pool.clone(),
                Duration::from_secs(config.reports.query_timeout_secs),
            )),
            tracking: Arc::new(ReportTrackingRepository::new(pool.clone())),
            directory: build_directory(&config.directory)?,
        })
    }
}

/// Select the user directory named by `directory.provider`.
pub fn build_directory(config: &DirectoryConfig) -> Result<Arc<dyn UserDirectory>, DirectoryError> {
    match config.provider.as_str() {
        "graph" => Ok(Arc::new(GraphUserDirectory::new(config)?)),
        "stub" => {
            tracing::warn!("Using stub user directory; every bearer token resolves to one user");
            Ok(Arc::new(StubUserDirectory::new(UserDetails {
                id: config.stub_user_id.clone(),
                display_name: config.stub_display_name.clone(),
                email: config.stub_email.clone(),
                user_principal_name: config.stub_user_principal_name.clone(),
            })))
        }
        other => Err(DirectoryError::UserServiceFailure(format!(
            "Unknown directory provider '{}'",
            other
        ))),
    }
}

pub fn create_app(config: Config, pool: PgPool, services: AppServices) -> Router {
    let config = Arc::new(config);

    let reports = Arc::new(ReportExportService::new(
        services.definitions,
        services.executor,
        services.tracking,
        config.reports.output_base_url.clone(),
    ));

    let state = AppState {
        pool,
        config: config.clone(),
        reports,
        directory: services.directory,
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
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

    // Report routes require a directory-verified bearer token
    let protected_routes = Router::new()
        .route("/api/v1/reports", get(reports::list_reports))
        .route("/api/v1/reports/:report_id", get(reports::download_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
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
