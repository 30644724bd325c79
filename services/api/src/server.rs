use crate::cli::ServeArgs;
use crate::infra::{load_dataset, AppState};
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use wahlmatch::config::{AppConfig, DisplayConfig};
use wahlmatch::error::AppError;
use wahlmatch::workflows::share::{FileBackgrounds, ShareRenderer};

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));

    let dataset = load_dataset(&config)?;
    let display = DisplayConfig::load(&config.display_config_path)?;
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        dataset,
        display: Arc::new(display),
        backgrounds: Arc::new(FileBackgrounds::new(&config.data.dir)),
        renderer: Arc::new(ShareRenderer::with_system_fonts(config.font_dir.as_deref())),
    };

    let app = router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "match service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
