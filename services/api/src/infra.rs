use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use review_desk::reviews::approvals::ApprovalStore;
use review_desk::reviews::sources::google::GooglePlacesSource;
use review_desk::reviews::ReviewService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the review endpoints need, generic over the approval store so
/// handler tests can run against the in-memory implementation.
pub(crate) struct ReviewState<S> {
    pub(crate) service: ReviewService<S>,
    pub(crate) google: Option<GooglePlacesSource>,
}

impl<S: ApprovalStore> ReviewState<S> {
    pub(crate) fn new(service: ReviewService<S>, google: Option<GooglePlacesSource>) -> Self {
        Self { service, google }
    }
}
