//! HTTP dataset-quality service.
//!
//! A thin hyper layer over `eda_core`. Handlers live in this library so
//! they can be driven without a socket; the `eda-api` binary only reads the
//! configuration and calls [`serve`].
//!
//! | Route | Body | Response |
//! |---|---|---|
//! | `GET /health` | | [`HealthResponse`] |
//! | `POST /quality` | JSON [`QualityRequest`] | [`QualityResponse`] |
//! | `POST /quality-from-csv` | multipart `file` | [`QualityResponse`] |
//! | `POST /quality-flags-from-csv` | multipart `file` | [`FlagsResponse`] |
//! | `POST /summary-from-csv` | multipart `file` | [`eda_core::JsonSummary`] |

pub mod config;
pub mod error;
pub mod models;
pub mod observer;

pub use config::{ServiceConfig, ServiceConfigError};
pub use error::ApiError;
pub use models::{DatasetShape, FlagsResponse, HealthResponse, QualityRequest, QualityResponse};
pub use observer::{RequestEvent, RequestObserver, TracingObserver};

use eda_core::{
    DatasetSummary, LoadOptions, QualityReport, analyze_missingness, ensure_not_empty,
    json_summary, load_csv_bytes, profile_dataset, score_quality,
};
use hyper::body::HttpBody;
use hyper::header::{self, HeaderValue};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use models::owned_flags;
use multer::{Constraints, Multipart, SizeLimit};
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Content types accepted for the uploaded CSV part. Browsers disagree on
/// what to send for `.csv` files.
const CSV_CONTENT_TYPES: [&str; 3] = [
    "text/csv",
    "application/vnd.ms-excel",
    "application/octet-stream",
];

const ROUTES: [&str; 5] = [
    "/health",
    "/quality",
    "/quality-from-csv",
    "/quality-flags-from-csv",
    "/summary-from-csv",
];

/// Shared state handed to every request.
pub struct Context {
    pub config: ServiceConfig,
    pub observer: Arc<dyn RequestObserver>,
}

impl Context {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    pub fn with_observer(config: ServiceConfig, observer: Arc<dyn RequestObserver>) -> Self {
        Self { config, observer }
    }

    fn is_ready(&self, score: f64) -> bool {
        score >= self.config.readiness_threshold
    }
}

/// Bind the configured address and serve until `shutdown` resolves.
pub async fn serve<F>(context: Context, shutdown: F) -> hyper::Result<()>
where
    F: Future<Output = ()>,
{
    let addr = context.config.socket_addr();
    let context = Arc::new(context);
    let service = make_service_fn(move |_| {
        let context = context.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                let context = context.clone();
                async move { Ok::<_, Infallible>(handle(context, request).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)?;
    info!("Serving on http://{}", addr);
    server.serve(service).with_graceful_shutdown(shutdown).await
}

/// Route one request.
pub async fn handle(context: Arc<Context>, request: Request<Body>) -> Response<Body> {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let result = match (&method, path.as_str()) {
        (&Method::GET, "/health") => Ok(json_response(StatusCode::OK, &HealthResponse::ok())),
        (&Method::POST, "/quality") => quality(&context, request).await,
        (&Method::POST, "/quality-from-csv") => quality_from_csv(&context, request).await,
        (&Method::POST, "/quality-flags-from-csv") => {
            quality_flags_from_csv(&context, request).await
        }
        (&Method::POST, "/summary-from-csv") => summary_from_csv(&context, request).await,
        (_, path) if ROUTES.contains(&path) => Err(ApiError::MethodNotAllowed),
        _ => Err(ApiError::NotFound),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                warn!("{} {} {}: {}", method, path, status.as_u16(), e);
            } else {
                debug!("{} {} {}: {}", method, path, status.as_u16(), e);
            }
            e.into_response()
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn quality(context: &Context, request: Request<Body>) -> Result<Response<Body>, ApiError> {
    let start = Instant::now();
    let bytes = read_body(request.into_body(), context.config.max_upload_bytes).await?;
    let req: QualityRequest = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;
    req.validate()?;

    let score = req.score();
    let ok_for_model = context.is_ready(score);
    let message = if ok_for_model {
        "Enough data to train a model (by current heuristics)."
    } else {
        "Data quality is insufficient, more work is needed (by current heuristics)."
    };

    let response = QualityResponse {
        ok_for_model,
        quality_score: score,
        message: message.to_string(),
        latency_ms: elapsed_ms(start),
        flags: owned_flags(req.flags()),
        dataset_shape: DatasetShape {
            n_rows: req.n_rows,
            n_cols: req.n_cols,
        },
    };

    context.observer.on_request(&RequestEvent {
        endpoint: "/quality",
        filename: None,
        n_rows: req.n_rows,
        n_cols: req.n_cols,
        score: Some(score),
        latency_ms: response.latency_ms,
    });

    Ok(json_response(StatusCode::OK, &response))
}

async fn quality_from_csv(
    context: &Context,
    request: Request<Body>,
) -> Result<Response<Body>, ApiError> {
    let start = Instant::now();
    let upload = read_upload(request, context.config.max_upload_bytes).await?;
    let analysis = analyze_upload(upload.bytes).await?;

    let score = analysis.quality.score;
    let ok_for_model = context.is_ready(score);
    let message = if ok_for_model {
        "CSV looks good enough for model training (by current heuristics)."
    } else {
        "CSV needs more work before model training (by current heuristics)."
    };

    let shape = analysis.shape();
    let response = QualityResponse {
        ok_for_model,
        quality_score: score,
        message: message.to_string(),
        latency_ms: elapsed_ms(start),
        flags: owned_flags(analysis.quality.boolean_flags()),
        dataset_shape: shape,
    };

    context.observer.on_request(&RequestEvent {
        endpoint: "/quality-from-csv",
        filename: upload.filename,
        n_rows: shape.n_rows,
        n_cols: shape.n_cols,
        score: Some(score),
        latency_ms: response.latency_ms,
    });

    Ok(json_response(StatusCode::OK, &response))
}

async fn quality_flags_from_csv(
    context: &Context,
    request: Request<Body>,
) -> Result<Response<Body>, ApiError> {
    let start = Instant::now();
    let upload = read_upload(request, context.config.max_upload_bytes).await?;
    let analysis = analyze_upload(upload.bytes).await?;

    let response = FlagsResponse {
        flags: owned_flags(analysis.quality.boolean_flags()),
    };

    let shape = analysis.shape();
    context.observer.on_request(&RequestEvent {
        endpoint: "/quality-flags-from-csv",
        filename: upload.filename,
        n_rows: shape.n_rows,
        n_cols: shape.n_cols,
        score: None,
        latency_ms: elapsed_ms(start),
    });

    Ok(json_response(StatusCode::OK, &response))
}

async fn summary_from_csv(
    context: &Context,
    request: Request<Body>,
) -> Result<Response<Body>, ApiError> {
    let start = Instant::now();
    let upload = read_upload(request, context.config.max_upload_bytes).await?;
    let analysis = analyze_upload(upload.bytes).await?;

    let summary = json_summary(&analysis.summary, &analysis.quality);

    let shape = analysis.shape();
    context.observer.on_request(&RequestEvent {
        endpoint: "/summary-from-csv",
        filename: upload.filename,
        n_rows: shape.n_rows,
        n_cols: shape.n_cols,
        score: Some(summary.quality_score),
        latency_ms: elapsed_ms(start),
    });

    Ok(json_response(StatusCode::OK, &summary))
}

// ============================================================================
// Upload handling
// ============================================================================

struct Upload {
    filename: Option<String>,
    bytes: Vec<u8>,
}

/// Read the multipart field `file`. Other fields are ignored.
/// Collect a request body, failing as soon as it grows past `max_bytes`.
async fn read_body(mut body: Body, max_bytes: u64) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk =
            chunk.map_err(|e| ApiError::BadRequest(format!("Failed to read request body: {e}")))?;
        if (bytes.len() + chunk.len()) as u64 > max_bytes {
            return Err(ApiError::PayloadTooLarge(max_bytes));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_upload(request: Request<Body>, max_bytes: u64) -> Result<Upload, ApiError> {
    let boundary = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| ApiError::BadRequest("Expected a multipart/form-data body".to_string()))?;

    let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(max_bytes));
    let mut multipart = Multipart::with_constraints(request.into_body(), boundary, constraints);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if let Some(mime) = field.content_type() {
            if !CSV_CONTENT_TYPES.contains(&mime.essence_str()) {
                return Err(ApiError::BadRequest(
                    "Expected a CSV file (content-type text/csv)".to_string(),
                ));
            }
        }

        let filename = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;
        return Ok(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::BadRequest("A file is required".to_string()))
}

fn multipart_error(error: multer::Error, max_bytes: u64) -> ApiError {
    match error {
        multer::Error::StreamSizeExceeded { .. } | multer::Error::FieldSizeExceeded { .. } => {
            ApiError::PayloadTooLarge(max_bytes)
        }
        other => ApiError::BadRequest(format!("Failed to parse request body: {other}")),
    }
}

// ============================================================================
// Profiling
// ============================================================================

struct CsvAnalysis {
    summary: DatasetSummary,
    quality: QualityReport,
}

impl CsvAnalysis {
    fn shape(&self) -> DatasetShape {
        DatasetShape {
            n_rows: self.summary.row_count,
            n_cols: self.summary.column_count,
        }
    }
}

/// Load and profile an upload off the async workers.
async fn analyze_upload(bytes: Vec<u8>) -> Result<CsvAnalysis, ApiError> {
    let analysis = tokio::task::spawn_blocking(move || -> eda_core::Result<CsvAnalysis> {
        let table = load_csv_bytes(&bytes, &LoadOptions::default())?;
        ensure_not_empty(&table)?;

        let summary = profile_dataset(&table);
        let missingness = analyze_missingness(&table);
        let quality = score_quality(&summary, &missingness);
        Ok(CsvAnalysis { summary, quality })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Profiling task failed: {e}")))??;

    Ok(analysis)
}

// ============================================================================
// Responses
// ============================================================================

pub(crate) fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    let (status, body) = match serde_json::to_vec(value) {
        Ok(body) => (status, body),
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"detail":"Failed to serialize response"}"#.to_vec(),
            )
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
