use course_lens::config::AnalysisConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    /// Caps applied to every upload; each request still runs its own pipeline.
    pub(crate) analysis: Arc<AnalysisConfig>,
}
