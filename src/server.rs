use crate::config::AppConfig;
use crate::data;
use crate::page::index_page;
use crate::render::render_svg;
use crate::state::{AppState, CountyStats, View};
use crate::types::Statistic;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

pub type SharedState = Arc<RwLock<AppState>>;

#[derive(Deserialize)]
pub struct SelectParams {
    statistic: Option<String>,
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    active: Statistic,
    population: &'static str,
    students: &'static str,
    geometry: &'static str,
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let state: SharedState = Arc::new(RwLock::new(AppState::new(config.render.clone())?));

    // Each source lands in the shared state as soon as it is read
    spawn_loads(&config, &state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn spawn_loads(config: &AppConfig, state: &SharedState) {
    let input = config.input.clone();
    let shared = state.clone();
    tokio::spawn(async move {
        let loaded = data::load_population(&input).await;
        shared.write().await.set_population(loaded);
    });

    let input = config.input.clone();
    let shared = state.clone();
    tokio::spawn(async move {
        let loaded = data::load_students(&input).await;
        shared.write().await.set_students(loaded);
    });

    let input = config.input.clone();
    let shared = state.clone();
    tokio::spawn(async move {
        let loaded = data::load_geometry(&input).await;
        shared.write().await.set_counties(loaded);
    });
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/map.svg", get(svg_handler))
        .route("/api/view", get(view_handler))
        .route("/api/query", get(query_handler))
        .route("/api/status", get(status_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index_handler(State(state): State<SharedState>) -> Response {
    match index_page(&*state.read().await) {
        Ok(page) => Html(page).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Selects the requested statistic (if any) and returns the repaint.
async fn view_handler(
    State(state): State<SharedState>,
    Query(params): Query<SelectParams>,
) -> Json<View> {
    let mut state = state.write().await;
    let view = match params.statistic {
        Some(value) => state.select(Statistic::from_option_value(&value)),
        None => state.view(),
    };
    Json(view)
}

async fn svg_handler(
    State(state): State<SharedState>,
    Query(params): Query<SelectParams>,
) -> Response {
    let mut state = state.write().await;
    if let Some(value) = params.statistic {
        state.select(Statistic::from_option_value(&value));
    }
    match render_svg(&state) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn query_handler(
    State(state): State<SharedState>,
    Query(params): Query<QueryParams>,
) -> Json<Option<CountyStats>> {
    Json(state.read().await.lookup(params.lon, params.lat))
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    let state = state.read().await;
    let [(_, population), (_, students), (_, geometry)] = state.source_status();
    Json(StatusResponse { active: state.active(), population, students, geometry })
}

fn internal_error(e: anyhow::Error) -> Response {
    error!(error = %format!("{e:#}"), "Request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
}
