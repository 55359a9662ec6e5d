use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_premium_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use premium_engine::config::AppConfig;
use premium_engine::error::AppError;
use premium_engine::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let premium_service = Arc::new(build_service(&config)?);

    let app = with_premium_routes(premium_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        tax_rate = config.engine.tax_rate,
        ncb_slab = ?config.engine.ncb_slab,
        "premium engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
