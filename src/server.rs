use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use handlebars::Handlebars;
use http::{HeaderValue, StatusCode};
use std::sync::Arc;
use tracing::{error, info};

use crate::rancher::ResourceProvider;
use crate::render::{page_templates, render_html};
use crate::report::Verdict;
use crate::runner::CheckRunner;
use crate::types::{CheckKind, Config};

pub const ALARM_LEVEL_HEADER: &str = "x-alarm-level";

#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn ResourceProvider>,
    config: Arc<Config>,
    templates: Arc<Handlebars<'static>>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ResourceProvider>, config: Config) -> Result<Self> {
        Ok(Self {
            provider,
            config: Arc::new(config),
            templates: Arc::new(page_templates()?),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/all", get(check_all))
        .route("/{check}", get(check_one))
        .with_state(state)
}

pub async fn serve(listen: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to listen on {}", listen))?;
    info!("Listening on {}", listen);
    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

async fn check_one(State(state): State<AppState>, Path(check): Path<String>) -> Response {
    let Some(kind) = CheckKind::from_name(&check) else {
        return (StatusCode::NOT_FOUND, "unknown check").into_response();
    };
    // Fresh lookup caches per request
    let runner = CheckRunner::new(state.provider.as_ref(), &state.config);
    let verdict = runner.run(kind).await;
    respond(&state, kind.as_str(), &verdict)
}

async fn check_all(State(state): State<AppState>) -> Response {
    let runner = CheckRunner::new(state.provider.as_ref(), &state.config);
    let verdict = runner.run_all().await.verdict();
    respond(&state, "all", &verdict)
}

fn respond(state: &AppState, title: &str, verdict: &Verdict) -> Response {
    info!("GET /{} -> {}", title, verdict.severity);
    let level = HeaderValue::from(verdict.exit_code());
    match render_html(&state.templates, title, verdict) {
        Ok(page) => (StatusCode::OK, [(ALARM_LEVEL_HEADER, level)], Html(page)).into_response(),
        Err(e) => {
            error!("Failed to render {} page: {:#}", title, e);
            (StatusCode::INTERNAL_SERVER_ERROR, [(ALARM_LEVEL_HEADER, level)], "render failure").into_response()
        }
    }
}
