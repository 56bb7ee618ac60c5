//! Axum handlers for the login gate and the analysis console

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::App;
use crate::render::{render_console, render_login, ConsoleView};
use crate::session::{session_cookie, session_id_from_cookie_header, SessionStore};

use super::forms::{AnalyzeForm, LoginForm};

/// Uploads of several high-resolution photos fit comfortably.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across handlers
pub struct ConsoleState {
    pub app: App,
    pub sessions: SessionStore,
}

impl ConsoleState {
    pub fn new(app: App, sessions: SessionStore) -> Self {
        Self { app, sessions }
    }

    /// Find the caller's session id, minting a new one (and a cookie to
    /// carry it) when the request has none.
    fn resolve_session(&self, headers: &HeaderMap) -> (Uuid, Option<String>) {
        let presented = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_id_from_cookie_header);

        match presented {
            Some(id) => (id, None),
            None => {
                let id = self.sessions.open();
                (id, Some(session_cookie(id)))
            }
        }
    }
}

/// Create the console router
pub fn create_router(state: Arc<ConsoleState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/login", post(login_handler))
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn with_cookie(cookie: Option<String>, response: impl IntoResponse) -> Response {
    (AppendHeaders(cookie.map(|c| (SET_COOKIE, c))), response).into_response()
}

/// Login page or empty console, depending on the session.
async fn index_handler(State(state): State<Arc<ConsoleState>>, headers: HeaderMap) -> Response {
    let (session, cookie) = state.resolve_session(&headers);

    let html = if state.sessions.is_authenticated(session) {
        render_console(&ConsoleView::default())
    } else {
        render_login(None, "")
    };
    with_cookie(cookie, Html(html))
}

async fn login_handler(
    State(state): State<Arc<ConsoleState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let (session, cookie) = state.resolve_session(&headers);

    match state.sessions.login(session, &form.email, &form.password) {
        Ok(()) => with_cookie(cookie, Redirect::to("/")),
        Err(e) => with_cookie(
            cookie,
            Html(render_login(Some(&e.to_string()), &form.email)),
        ),
    }
}

async fn analyze_handler(
    State(state): State<Arc<ConsoleState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (session, cookie) = state.resolve_session(&headers);
    if !state.sessions.is_authenticated(session) {
        warn!("Analyze request from unauthenticated session {}", session);
        return with_cookie(cookie, Redirect::to("/"));
    }

    let form = match AnalyzeForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected analyze form: {}", e);
            return bad_request(cookie, e.to_string());
        }
    };

    let mode = match form.detection_mode() {
        Ok(mode) => mode,
        Err(e) => return bad_request(cookie, e.to_string()),
    };

    if form.files.is_empty() {
        let view = ConsoleView {
            selected: Some(mode),
            panels: Vec::new(),
            notice: Some("Choose at least one image to analyze.".to_string()),
        };
        return with_cookie(cookie, Html(render_console(&view)));
    }

    let panels = state.app.analyze(mode, form.files).await;
    info!("Rendering {} panel(s) for {}", panels.len(), mode);

    let view = ConsoleView {
        selected: Some(mode),
        panels,
        notice: None,
    };
    with_cookie(cookie, Html(render_console(&view)))
}

fn bad_request(cookie: Option<String>, message: String) -> Response {
    let view = ConsoleView {
        selected: None,
        panels: Vec::new(),
        notice: Some(message),
    };
    with_cookie(cookie, (StatusCode::BAD_REQUEST, Html(render_console(&view))))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
