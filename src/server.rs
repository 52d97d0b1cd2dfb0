use axum::{
    extract::{Extension, Path, Query},
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use hyper::Server;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::domain::{CatalogDocument, MergedEvent};
use crate::pipeline::Aggregator;

/// Shared serving state: the cached catalog snapshot plus the aggregator
/// used to refresh it on demand.
pub struct AppState {
    pub catalog: RwLock<Option<CatalogDocument>>,
    pub aggregator: Arc<Aggregator>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "bhm-scraper",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn no_data() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "No events found. Run scraper first." })),
    )
}

/// GET /api/events — the whole catalog document
async fn all_events(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.catalog.read().await.as_ref() {
        Some(catalog) => Json(catalog.clone()).into_response(),
        None => no_data().into_response(),
    }
}

/// GET /api/events/by-date — metadata plus the date-grouped map
async fn events_by_date(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.catalog.read().await.as_ref() {
        Some(catalog) => Json(json!({
            "metadata": catalog.metadata,
            "events": catalog.events_by_date,
        }))
        .into_response(),
        None => no_data().into_response(),
    }
}

/// GET /api/events/date/:date — events for one ISO date
async fn events_for_date(
    Extension(state): Extension<Arc<AppState>>,
    Path(date): Path<String>,
) -> impl IntoResponse {
    match state.catalog.read().await.as_ref() {
        Some(catalog) => {
            let events: Vec<MergedEvent> = catalog
                .events_by_date
                .get(&date)
                .cloned()
                .unwrap_or_default();
            Json(json!({
                "date": date,
                "count": events.len(),
                "events": events,
            }))
            .into_response()
        }
        None => no_data().into_response(),
    }
}

/// GET /api/events/upcoming — dates from today forward, by string comparison
/// over the fixed-width ISO format
async fn upcoming_events(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.catalog.read().await.as_ref() {
        Some(catalog) => {
            let today = Utc::now().format("%Y-%m-%d").to_string();
            let upcoming: BTreeMap<&String, &Vec<MergedEvent>> = catalog
                .events_by_date
                .iter()
                .filter(|(date, _)| date.as_str() >= today.as_str())
                .collect();
            let count: usize = upcoming.values().map(|events| events.len()).sum();
            Json(json!({
                "count": count,
                "events": upcoming,
            }))
            .into_response()
        }
        None => no_data().into_response(),
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// GET /api/events/search?q= — case-insensitive substring match over title,
/// description, venue and category
async fn search_events(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default().to_lowercase();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Search query required (q parameter)" })),
        )
            .into_response();
    }

    match state.catalog.read().await.as_ref() {
        Some(catalog) => {
            let results: Vec<MergedEvent> = catalog
                .all_events
                .iter()
                .filter(|e| {
                    e.event.title.to_lowercase().contains(&query)
                        || e.event.description.to_lowercase().contains(&query)
                        || e.event.location.venue.to_lowercase().contains(&query)
                        || e.event.category.to_lowercase().contains(&query)
                })
                .cloned()
                .collect();
            Json(json!({
                "query": query,
                "count": results.len(),
                "events": results,
            }))
            .into_response()
        }
        None => no_data().into_response(),
    }
}

/// GET /api/metadata — metadata block only
async fn metadata(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.catalog.read().await.as_ref() {
        Some(catalog) => Json(catalog.metadata.clone()).into_response(),
        None => no_data().into_response(),
    }
}

/// POST /api/scrape — manual refresh; responds immediately and rebuilds the
/// snapshot in the background
async fn trigger_scrape(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    info!("Manual scrape triggered");
    tokio::spawn(async move {
        match state.aggregator.run().await {
            Ok(document) => {
                *state.catalog.write().await = Some(document);
                info!("Manual scrape complete");
            }
            Err(e) => error!("Manual scrape failed: {}", e),
        }
    });

    Json(json!({ "message": "Scraping started", "status": "in_progress" }))
}

/// Create the HTTP server with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/events", get(all_events))
        .route("/api/events/by-date", get(events_by_date))
        .route("/api/events/date/:date", get(events_for_date))
        .route("/api/events/upcoming", get(upcoming_events))
        .route("/api/events/search", get(search_events))
        .route("/api/metadata", get(metadata))
        .route("/api/scrape", post(trigger_scrape))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: Arc<AppState>, port: u16) -> std::result::Result<(), hyper::Error> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🎉 Events API running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("📅 All events:   http://localhost:{port}/api/events");

    Server::bind(&addr).serve(app.into_make_service()).await
}
