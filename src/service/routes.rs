use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::api::{DecideRequest, DecideResponse, StateResponse, SynthesizeRequest};
use super::config::ServiceConfig;
use super::error::ApiError;
use crate::audit::{AuditBackend, DecisionRecord, StateRecord};
use crate::policy::PolicyEngine;
use crate::telemetry::{AuditTable, Route, TelemetryEvent, TelemetryRecorder, TelemetrySnapshot};
use crate::vehicle::Synthesizer;

/// Shared per-process state. The engine and synthesizer are immutable; the
/// audit sink and telemetry window are the only things requests write to.
pub struct AppState {
    pub engine: PolicyEngine,
    pub synthesizer: Synthesizer,
    pub audit: AuditBackend,
    pub telemetry: Mutex<TelemetryRecorder>,
}

impl AppState {
    pub fn new(audit: AuditBackend, telemetry_capacity: usize) -> Result<Self> {
        Ok(Self {
            engine: PolicyEngine::new(),
            synthesizer: Synthesizer::new().context("loading scenario table")?,
            audit,
            telemetry: Mutex::new(TelemetryRecorder::with_capacity(telemetry_capacity)),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(config.audit.build()?, config.telemetry_capacity)
    }

    async fn record(&self, event: TelemetryEvent) {
        self.telemetry.lock().await.record(event);
    }

    pub async fn metrics(&self) -> TelemetrySnapshot {
        self.telemetry.lock().await.snapshot()
    }

    async fn rejected(&self, route: Route, err: &ApiError) {
        if err.is_client_error() {
            info!(?route, error = %err, "request rejected");
            self.record(TelemetryEvent::RequestRejected { route }).await;
        } else {
            warn!(?route, error = %err, "request failed");
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/decide", post(decide).options(preflight))
        .route("/synthesize-state", post(synthesize_state).options(preflight))
        .route("/healthz", get(healthz).options(preflight))
        .route("/metrics", get(metrics).options(preflight))
        .layer(middleware::map_response(allow_any_origin))
        .with_state(state)
}

/// Bind `config.bind` and serve until `shutdown` is cancelled.
pub async fn serve(config: ServiceConfig, shutdown: CancellationToken) -> Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(
        addr = %config.bind,
        audit_backend = state.audit.kind(),
        "cockpit listening"
    );
    serve_on(listener, state, shutdown).await
}

pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("http server")?;
    info!("cockpit stopped");
    Ok(())
}

async fn allow_any_origin(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("authorization, x-client-info, apikey, content-type"),
    );
    response
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn healthz(State(app): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "status": "ok", "audit_backend": app.audit.kind() }))
}

async fn metrics(State(app): State<Arc<AppState>>) -> Json<TelemetrySnapshot> {
    Json(app.metrics().await)
}

async fn decide(
    State(app): State<Arc<AppState>>,
    body: Result<Json<DecideRequest>, JsonRejection>,
) -> Result<Json<DecideResponse>, ApiError> {
    let result = serve_decision(&app, body).await;
    if let Err(err) = &result {
        app.rejected(Route::Decide, err).await;
    }
    result.map(Json)
}

async fn serve_decision(
    app: &AppState,
    body: Result<Json<DecideRequest>, JsonRejection>,
) -> Result<DecideResponse, ApiError> {
    let Json(request) = body?;
    let (command, ctx) = request.validate()?;

    let started = Instant::now();
    let decision = app.engine.decide(&command, &ctx);
    let elapsed = started.elapsed();
    let response_time_ms = elapsed.as_millis() as u64;
    debug!(
        tier = %decision.tier,
        latency_us = elapsed.as_micros() as u64,
        "decision served"
    );

    app.record(TelemetryEvent::DecisionServed {
        tier: decision.tier,
        intent: decision.intent,
        allowed: decision.allowed,
        latency_us: elapsed.as_micros() as u64,
    })
    .await;

    let record = DecisionRecord::new(
        command,
        decision.response.clone(),
        request.vehicle_state_id.clone(),
        response_time_ms,
    );
    let decision_id = match app.audit.append_decision(record).await {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(error = %err, backend = app.audit.kind(), "decision audit write failed");
            app.record(TelemetryEvent::AuditWriteFailed {
                table: AuditTable::Decisions,
            })
            .await;
            None
        }
    };

    Ok(DecideResponse {
        decision,
        response_time_ms,
        decision_id,
    })
}

async fn synthesize_state(
    State(app): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<StateResponse>, ApiError> {
    let result = serve_synthesis(&app, &body).await;
    if let Err(err) = &result {
        app.rejected(Route::SynthesizeState, err).await;
    }
    result.map(Json)
}

async fn serve_synthesis(app: &AppState, body: &[u8]) -> Result<StateResponse, ApiError> {
    let request: SynthesizeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SynthesizeRequest::default()
    } else {
        serde_json::from_slice(body)?
    };
    let patch = request.patch()?;
    let overridden = request.base_state.is_some() || !patch.is_empty();

    let state = match (&request.base_state, &request.scenario_state) {
        (Some(base), _) => app.synthesizer.synthesize_from(base, &patch)?,
        (None, Some(_)) => app.synthesizer.synthesize_standalone(&patch)?,
        (None, None) => {
            let fresh = {
                let mut rng = rand::thread_rng();
                app.synthesizer.synthesize(&mut rng)
            };
            if patch.is_empty() {
                fresh
            } else {
                app.synthesizer.synthesize_from(&fresh, &patch)?
            }
        }
    };

    app.record(TelemetryEvent::StateSynthesized {
        scenario: state.scenario_type,
        overridden,
    })
    .await;

    let record = StateRecord::new(state.clone());
    let created_at = record.created_at;
    let id = match app.audit.append_state(record).await {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(error = %err, backend = app.audit.kind(), "state audit write failed");
            app.record(TelemetryEvent::AuditWriteFailed {
                table: AuditTable::States,
            })
            .await;
            None
        }
    };

    Ok(StateResponse {
        id,
        created_at,
        state,
    })
}
