use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryProgramCatalog};
use crate::routes::with_program_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use entry_requirements::config::AppConfig;
use entry_requirements::error::AppError;
use entry_requirements::programs::requirements::EligibilityService;
use entry_requirements::programs::ProgramSeedImporter;
use entry_requirements::telemetry;
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

    let programs = match &config.seed_csv {
        Some(path) => {
            let programs = ProgramSeedImporter::from_path(path)?;
            info!(path = %path.display(), programs = programs.len(), "preloading program catalog");
            programs
        }
        None => Vec::new(),
    };
    let catalog = Arc::new(InMemoryProgramCatalog::with_programs(programs));
    let service = Arc::new(EligibilityService::new(catalog));

    let app = with_program_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "entry requirements service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
