use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::InvalidHeaderValue, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use vitals_core::{
    AnalysisResult, AssessmentCoordinator, ForecastResult, HrHistoryBuffer, StatusPrediction,
    VitalsInput,
};
use vitals_model::ModelSummary;

use crate::error::ApiError;

/// Capabilities advertised by `/health`
pub const SERVED_MODELS: [&str; 2] = ["logistic_regression", "hr_predictor"];

#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<AssessmentCoordinator>,
    summary: Arc<ModelSummary>,
    history: Arc<RwLock<HrHistoryBuffer>>,
}

impl AppState {
    pub fn new(
        coordinator: AssessmentCoordinator,
        summary: ModelSummary,
        history_capacity: usize,
    ) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            summary: Arc::new(summary),
            history: Arc::new(RwLock::new(HrHistoryBuffer::new(history_capacity))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HrHistoryRequest {
    #[serde(default)]
    pub hr_history: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    models: [&'static str; 2],
    classifier: ModelSummary,
    buffered_hr_samples: usize,
}

/// CORS for GET/POST from `origin`, or from anywhere when unset.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
        None => AllowOrigin::any(),
    };
    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict/status", post(predict_status))
        .route(
            "/predict/hr",
            post(predict_hr).get(predict_hr_from_buffer),
        )
        .route("/analyze", post(analyze))
        .route("/vitals", post(ingest_vitals))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    println!("vitals listening on http://{addr}");
    axum::serve(listener, app).await
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;
    log::info!("{} {} -> {}", method, path, response.status().as_u16());
    response
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        models: SERVED_MODELS,
        classifier: state.summary.as_ref().clone(),
        buffered_hr_samples: state.history.read().len(),
    })
}

async fn predict_status(
    State(state): State<AppState>,
    Json(input): Json<VitalsInput>,
) -> Json<StatusPrediction> {
    Json(state.coordinator.predict_status(&input))
}

async fn predict_hr(
    State(state): State<AppState>,
    Json(request): Json<HrHistoryRequest>,
) -> Result<Json<ForecastResult>, ApiError> {
    Ok(Json(state.coordinator.predict_hr(&request.hr_history)?))
}

async fn predict_hr_from_buffer(
    State(state): State<AppState>,
) -> Result<Json<ForecastResult>, ApiError> {
    let history = state.history.read().snapshot();
    Ok(Json(state.coordinator.predict_hr(&history)?))
}

async fn analyze(
    State(state): State<AppState>,
    Json(input): Json<VitalsInput>,
) -> Json<AnalysisResult> {
    Json(state.coordinator.analyze(&input))
}

/// Analyze a device reading and remember its heart rate for `GET /predict/hr`.
async fn ingest_vitals(
    State(state): State<AppState>,
    Json(input): Json<VitalsInput>,
) -> Json<AnalysisResult> {
    if let Some(heart_rate) = input.heart_rate {
        if let Some(evicted) = state.history.write().push(heart_rate) {
            log::trace!("hr buffer full, evicted {evicted}");
        }
    }
    Json(state.coordinator.analyze(&input))
}
