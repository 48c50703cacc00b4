//! HTTP surface: one in-memory wizard per visitor session.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use chrono::Utc;
use moka::future::Cache;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::form::ContactDetails;
use crate::manifest::WizardManifest;
use crate::render;
use crate::sink::SubmissionSink;
use crate::view::ViewModel;
use crate::wizard::{PendingAdvance, Wizard, WizardError, WizardEvent};

pub type SessionId = u64;
type Session = Arc<Mutex<Wizard>>;

/// Abandoned wizards are dropped after this long without a request.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

const DELIVERY_CANCELLED: &str = "request dropped during delivery";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown session {0}")]
    UnknownSession(SessionId),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("Session lock poisoned")]
    Poisoned,
    #[error("Failed to render fragment: {0}")]
    Render(#[from] askama::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
            ApiError::Wizard(
                WizardError::InvalidTransition { .. }
                | WizardError::SubmissionInFlight
                | WizardError::NoSubmissionInFlight,
            ) => StatusCode::CONFLICT,
            ApiError::Wizard(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Poisoned | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    manifest: Arc<WizardManifest>,
    sessions: Cache<SessionId, Session>,
    sink: Arc<dyn SubmissionSink>,
    auto_advance: Duration,
    next_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        manifest: Arc<WizardManifest>,
        sink: Arc<dyn SubmissionSink>,
        auto_advance: Duration,
    ) -> Self {
        Self {
            manifest,
            sessions: session_cache(DEFAULT_SESSION_IDLE, DEFAULT_MAX_SESSIONS),
            sink,
            auto_advance,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_session_limits(mut self, idle: Duration, max_sessions: u64) -> Self {
        self.sessions = session_cache(idle, max_sessions);
        self
    }

    async fn session(&self, id: SessionId) -> Result<Session, ApiError> {
        self.sessions
            .get(&id)
            .await
            .ok_or(ApiError::UnknownSession(id))
    }

    /// Runs `f` against one session. The lock is released before returning.
    async fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Wizard) -> Result<T, WizardError>,
    ) -> Result<T, ApiError> {
        let session = self.session(id).await?;
        let mut wizard = lock(&session)?;
        Ok(f(&mut wizard)?)
    }

    fn schedule_auto_advance(&self, id: SessionId, pending: PendingAdvance) {
        let state = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(pending.delay()).await;
            let fired = state
                .with_session(id, |wizard| wizard.fire_auto_advance(pending.token))
                .await;
            match fired {
                Ok(true) => tracing::debug!(session = id, step = pending.step, "Auto-advanced"),
                Ok(false) => {}
                Err(e) => tracing::warn!(session = id, error = %e, "Auto-advance dropped"),
            }
        });
    }
}

fn session_cache(idle: Duration, max_sessions: u64) -> Cache<SessionId, Session> {
    Cache::builder()
        .max_capacity(max_sessions)
        .time_to_idle(idle)
        .build()
}

fn lock(session: &Session) -> Result<MutexGuard<'_, Wizard>, ApiError> {
    session.lock().map_err(|_| ApiError::Poisoned)
}

/// Holds a session whose submission is in flight.
///
/// If the request future is dropped before [`DeliveryGuard::settle`], the
/// submission is recorded as failed so the visitor can retry.
struct DeliveryGuard {
    session: Session,
    settled: bool,
}

impl DeliveryGuard {
    fn new(session: Session) -> Self {
        Self {
            session,
            settled: false,
        }
    }

    fn settle(mut self, outcome: Result<(), String>) -> Result<ViewModel, ApiError> {
        self.settled = true;
        let mut wizard = lock(&self.session)?;
        wizard.finish_submission(outcome)?;
        Ok(wizard.view())
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Ok(mut wizard) = self.session.lock() else {
            return;
        };
        if let Err(e) = wizard.finish_submission(Err(DELIVERY_CANCELLED.to_string())) {
            tracing::debug!(error = %e, "Nothing to settle after dropped submission");
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCreated {
    session_id: SessionId,
    view: ViewModel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    view: ViewModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending_advance: Option<PendingAdvance>,
}

#[derive(Serialize)]
struct SubmitResponse {
    view: ViewModel,
    delivered: bool,
}

pub fn create_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_view).delete(close_session))
        .route("/api/sessions/{id}/fragment", get(get_fragment))
        .route("/api/sessions/{id}/events", post(post_event))
        .route("/api/sessions/{id}/submit", post(submit))
        .layer(CorsLayer::permissive()) // embedded on a third-party page
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let id = state.next_id.fetch_add(1, Ordering::Relaxed);
    let wizard = Wizard::new(state.manifest.clone()).with_auto_advance_delay(state.auto_advance);
    let view = wizard.view();
    state.sessions.insert(id, Arc::new(Mutex::new(wizard))).await;
    tracing::info!(session = id, "Session started");
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: id,
            view,
        }),
    ))
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    match state.sessions.remove(&id).await {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::UnknownSession(id)),
    }
}

async fn get_view(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<ViewModel>, ApiError> {
    let view = state.with_session(id, |wizard| Ok(wizard.view())).await?;
    Ok(Json(view))
}

async fn get_fragment(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Html<String>, ApiError> {
    let view = state.with_session(id, |wizard| Ok(wizard.view())).await?;
    Ok(Html(render::document(&view)?))
}

async fn post_event(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(event): Json<WizardEvent>,
) -> Result<Json<EventResponse>, ApiError> {
    let (view, pending) = state
        .with_session(id, |wizard| {
            let pending = wizard.apply(event)?;
            Ok((wizard.view(), pending))
        })
        .await?;
    if let Some(pending) = pending {
        state.schedule_auto_advance(id, pending);
    }
    Ok(Json(EventResponse {
        view,
        pending_advance: pending,
    }))
}

async fn submit(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(contact): Json<ContactDetails>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let session = state.session(id).await?;
    let record = lock(&session)?.begin_submission(&contact, Utc::now())?;
    let guard = DeliveryGuard::new(session);

    let outcome = state.sink.deliver(&record).await.map_err(|e| e.to_string());
    let delivered = outcome.is_ok();
    match &outcome {
        Ok(()) => tracing::info!(session = id, sink = state.sink.name(), "Lead submitted"),
        Err(reason) => {
            tracing::warn!(session = id, sink = state.sink.name(), %reason, "Lead delivery failed")
        }
    }

    let view = guard.settle(outcome)?;
    Ok(Json(SubmitResponse { view, delivered }))
}
