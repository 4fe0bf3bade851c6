use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryCommissionLedger, InMemoryProjectRepository, InMemoryProposalRepository,
};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use solar_crm::config::AppConfig;
use solar_crm::error::AppError;
use solar_crm::telemetry;
use solar_crm::workflows::projects::ProjectService;
use solar_crm::workflows::proposals::ProposalService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

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
        assumptions: config.model,
    };

    if config.commissions.enabled && config.commissions.schedule.total_percent() == 0.0 {
        warn!("commission tracking enabled but no COMMISSION_PCT_* values are set");
    }
    for (milestone, percent) in config.commissions.schedule.entries() {
        debug!(%milestone, percent, "commission tranche configured");
    }

    let proposal_service = Arc::new(ProposalService::new(
        Arc::new(InMemoryProposalRepository::default()),
        config.model,
    ));
    let project_service = Arc::new(
        ProjectService::new(
            Arc::new(InMemoryProjectRepository::default()),
            Arc::new(InMemoryCommissionLedger::default()),
            config.commissions.clone(),
        )
        .with_gross_value_lookup(proposal_service.clone()),
    );

    let app = with_service_routes(proposal_service, project_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        commission_tracking = config.commissions.enabled,
        "solar proposal service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
