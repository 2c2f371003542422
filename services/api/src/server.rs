use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use review_desk::config::AppConfig;
use review_desk::error::AppError;
use review_desk::reviews::approvals::JsonFileApprovalStore;
use review_desk::reviews::sources::google::GooglePlacesSource;
use review_desk::reviews::sources::{
    FallbackSource, HostawaySource, MockFileSource, RawReviewSource,
};
use review_desk::reviews::ReviewService;
use review_desk::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{AppState, ReviewState};
use crate::routes::with_review_routes;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(JsonFileApprovalStore::new(config.data.approvals_file()));
    let mock: Arc<dyn RawReviewSource> =
        Arc::new(MockFileSource::new(config.data.mock_reviews_file()));
    let live = if config.use_mock {
        None
    } else {
        config.hostaway.as_ref().map(|hostaway| {
            let source =
                HostawaySource::new(&hostaway.base_url, &hostaway.account_id, &hostaway.api_key);
            Arc::new(FallbackSource::new(Arc::new(source), mock.clone()))
                as Arc<dyn RawReviewSource>
        })
    };

    let service = ReviewService::new(store, live, mock);
    let google = config.google_api_key.clone().map(GooglePlacesSource::new);
    let review_state = Arc::new(ReviewState::new(service, google));

    let app = with_review_routes(review_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "review moderation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
