use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry::KeyValue;
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use surfsup_core::{
    MemoryDataset, PrecipitationSeries, QueryEngine, QueryError, TemperatureObservation,
    TemperatureStats,
};

pub const API_PREFIX: &str = "/api/v1.0";

const HOME_PAGE: &str = "Available Routes:<br/>\
    /api/v1.0/precipitation: Precipitation data for the last 12 months<br/>\
    /api/v1.0/stations: List of stations<br/>\
    /api/v1.0/tobs: Temperature observations for the most active station in the last year<br/>\
    /api/v1.0/&lt;start&gt;: Minimum, average and maximum temperature from the start date to the most recent date<br/>\
    /api/v1.0/&lt;start&gt;/&lt;end&gt;: Minimum, average and maximum temperature for the date range<br/>";

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    engine: QueryEngine<MemoryDataset>,
}

impl AppState {
    pub fn engine(&self) -> &QueryEngine<MemoryDataset> {
        &self.engine
    }

    fn count_request(&self, route: &'static str) {
        self.requests_total.add(1, &[KeyValue::new("route", route)]);
    }
}

pub fn build_app(dataset: MemoryDataset) -> Result<(Router, Arc<AppState>)> {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .context("failed to build prometheus exporter")?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("surfsup-api");

    let requests_total = meter
        .u64_counter("surfsup_requests_total")
        .with_description("Total HTTP requests served")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        engine: QueryEngine::new(dataset),
    });

    // Static segments win over the `:start` capture
    let api = Router::new()
        .route("/precipitation", get(precipitation))
        .route("/stations", get(stations))
        .route("/tobs", get(tobs))
        .route("/:start", get(temperature_from))
        .route("/:start/:end", get(temperature_range));

    let router = Router::new()
        .route("/", get(home))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .nest(API_PREFIX, api)
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

/// Query failure as seen by HTTP callers
pub struct ApiError(QueryError);

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            tracing::warn!(error = %self.0, "rejected query");
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = ?self.0, "query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

async fn home(State(state): State<Arc<AppState>>) -> Html<&'static str> {
    state.count_request("home");
    Html(HOME_PAGE)
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.count_request("healthz");
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrecipitationSeries>, ApiError> {
    state.count_request("precipitation");
    Ok(Json(state.engine.precipitation_last_year()?))
}

async fn stations(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    state.count_request("stations");
    Json(state.engine.list_stations())
}

async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureObservation>>, ApiError> {
    state.count_request("tobs");
    let result = state.engine.most_active_station_observations()?;
    tracing::debug!(station = %result.station_id, "serving most active station");
    Ok(Json(result.observations))
}

async fn temperature_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStats>, ApiError> {
    state.count_request("temperature_from");
    Ok(Json(state.engine.temperature_stats(&start, None)?))
}

async fn temperature_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStats>, ApiError> {
    state.count_request("temperature_range");
    Ok(Json(state.engine.temperature_stats(&start, Some(&end))?))
}
