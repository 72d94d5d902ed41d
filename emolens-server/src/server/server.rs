use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::HeaderValue,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use emolens_core::{model_catalog, parse_model_ids, AnalyzeResponse, Analyzer, EmolensError};
use serde::Serialize;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

use super::state::{ServerState, SharedAnalyzer};
use super::ApiError;
use crate::settings::ServerSettings;

#[derive(Serialize)]
struct ServerInfo {
    pub message: &'static str,
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerInfo {
        message: "Audio Emotion Analyzer API",
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

async fn list_models() -> impl IntoResponse {
    Json(model_catalog())
}

/// `POST /api/analyze`: multipart `audio` (file) + `models` (JSON array).
async fn analyze(
    State(analyzer): State<SharedAnalyzer>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut audio: Option<Bytes> = None;
    let mut models: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("audio") => audio = Some(field.bytes().await?),
            Some("models") => models = Some(field.text().await?),
            other => debug!(field = ?other, "ignoring unknown multipart field"),
        }
    }

    let models =
        models.ok_or_else(|| EmolensError::Validation("missing `models` field".into()))?;
    let model_ids = parse_model_ids(&models)?;
    let audio = audio.ok_or_else(|| EmolensError::Validation("missing `audio` field".into()))?;

    info!(
        bytes = audio.len(),
        models = model_ids.len(),
        "analyze request"
    );

    let spectrograms = tokio::task::spawn_blocking(move || analyzer.analyze(&audio, &model_ids))
        .await
        .map_err(|e| ApiError::internal(format!("analysis task failed: {e}")))??;

    Ok(Json(AnalyzeResponse { spectrograms }))
}

fn make_cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

pub fn make_app(settings: ServerSettings, analyzer: Analyzer) -> Result<Router> {
    let cors = make_cors_layer(&settings.allowed_origins)?;
    let body_limit = settings.max_upload_bytes();
    let state = ServerState::new(analyzer);

    let api_routes: Router<ServerState> = Router::new()
        .route("/analyze", post(analyze))
        .route("/models", get(list_models));

    let app: Router = Router::new()
        .route("/", get(home))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

pub async fn run_server(settings: ServerSettings, analyzer: Analyzer) -> Result<()> {
    let addr = settings.bind_addr();
    let app = make_app(settings, analyzer)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
