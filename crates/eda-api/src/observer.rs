//! Per-request observation.
//!
//! Every handled request produces one [`RequestEvent`]. The service passes it
//! to the injected [`RequestObserver`]; the default [`TracingObserver`] turns
//! it into a structured `tracing` event.

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEvent {
    pub endpoint: &'static str,
    /// Name of the uploaded file, for the CSV endpoints
    pub filename: Option<String>,
    pub n_rows: usize,
    pub n_cols: usize,
    /// Quality score, when the endpoint computes one
    pub score: Option<f64>,
    pub latency_ms: f64,
}

/// Receives one event per successfully handled request.
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, event: &RequestEvent);
}

/// Logs request events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, event: &RequestEvent) {
        info!(
            endpoint = event.endpoint,
            filename = ?event.filename,
            n_rows = event.n_rows,
            n_cols = event.n_cols,
            score = ?event.score,
            latency_ms = format_args!("{:.1}", event.latency_ms),
            "request handled"
        );
    }
}
