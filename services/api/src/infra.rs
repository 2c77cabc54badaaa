use metrics_exporter_prometheus::PrometheusHandle;
use org_compliance::analysis::AnalysisPolicy;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    /// Company rules used when a request does not override them.
    pub(crate) policy: AnalysisPolicy,
}
