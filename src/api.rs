use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::history;
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/fetch-news", get(fetch_news).post(fetch_news))
        .route("/api/latest", get(latest))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(untagged)]
enum FetchResp {
    Done { ok: bool, sent: usize },
    Failed { ok: bool, error: String },
}

async fn fetch_news(State(state): State<AppState>) -> (StatusCode, Json<FetchResp>) {
    let pipeline = state.pipeline.clone();
    // A panic inside the run surfaces as a JoinError instead of taking the server down.
    match tokio::spawn(async move { pipeline.run_once().await }).await {
        Ok(report) => (
            StatusCode::OK,
            Json(FetchResp::Done {
                ok: true,
                sent: report.sent,
            }),
        ),
        Err(e) => {
            counter!("pipeline_failures_total").increment(1);
            tracing::error!(target: "pipeline", error = %e, "run aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FetchResp::Failed {
                    ok: false,
                    error: e.to_string(),
                }),
            )
        }
    }
}

#[derive(Serialize)]
struct LatestResp {
    events: Vec<Value>,
}

async fn latest(State(state): State<AppState>) -> Json<LatestResp> {
    let events = history::latest_events(state.pipeline.store()).await;
    Json(LatestResp { events })
}
