use crate::browse::{self, ListingQuery};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::enrich::Enricher;
use crate::omdb::{OmdbApi, OmdbClient};
use crate::query::SortOrder;
use anyhow::{anyhow, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::TypedHeader;
use headers::{CacheControl, ETag, IfNoneMatch};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const CACHE_MAX_AGE: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub enricher: Enricher,
    etag: ETag,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, enricher: Enricher) -> Result<Self> {
        let etag = format!("\"{}\"", catalog.fingerprint())
            .parse::<ETag>()
            .map_err(|_| anyhow!("dataset fingerprint is not a valid ETag"))?;
        Ok(Self {
            catalog,
            enricher,
            etag,
        })
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let catalog = Arc::new(Catalog::load(&config.data_path)?);

    let enricher = match config.omdb_api_key.as_deref() {
        Some(key) => {
            let omdb: Arc<dyn OmdbApi> = Arc::new(OmdbClient::new(key)?);
            info!(
                "OMDb enrichment enabled ({} ms between detail lookups)",
                config.omdb_throttle.as_millis()
            );
            Enricher::new(omdb, config.omdb_throttle)
        }
        None => {
            warn!("OMDB_API_KEY not set, serving the local catalog only");
            Enricher::disabled()
        }
    };

    let state = AppState::new(catalog, enricher)?;
    let app = build_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/api/movies", get(list_movies))
        .route("/api/movies/genre/:genre", get(movies_by_genre))
        .route("/api/movies/:id", get(movie_detail))
        .route("/api/genres", get(genres))
        .route("/api/genres/:slug", get(genre_page))
        .route("/api/home", get(home))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Wraps a body that depends on nothing but the dataset with validators, or
/// answers 304 when the client already holds it.
fn cached<T: Serialize>(
    state: &AppState,
    if_none_match: Option<TypedHeader<IfNoneMatch>>,
    body: T,
) -> Response {
    let cache_control = CacheControl::new()
        .with_public()
        .with_max_age(CACHE_MAX_AGE);
    if let Some(TypedHeader(condition)) = if_none_match {
        if !condition.precondition_passes(&state.etag) {
            return (
                StatusCode::NOT_MODIFIED,
                TypedHeader(state.etag.clone()),
                TypedHeader(cache_control),
            )
                .into_response();
        }
    }
    (
        TypedHeader(state.etag.clone()),
        TypedHeader(cache_control),
        Json(body),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let text = params.q.unwrap_or_default();
    if text.trim().is_empty() {
        debug!("Rejecting search without a query");
        return error_response(StatusCode::BAD_REQUEST, "Query parameter \"q\" is required");
    }
    let results = browse::search(&state.catalog, &state.enricher, &text).await;
    Json(results).into_response()
}

async fn movies_by_genre(State(state): State<AppState>, Path(genre): Path<String>) -> Response {
    let movies = browse::movies_by_genre(&state.catalog, &state.enricher, &genre).await;
    Json(json!({ "movies": movies })).into_response()
}

async fn list_movies(
    State(state): State<AppState>,
    if_none_match: Option<TypedHeader<IfNoneMatch>>,
    axum_extra::extract::Query(params): axum_extra::extract::Query<ListingQuery>,
) -> Response {
    let sort = match params.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<SortOrder>() {
            Ok(order) => order,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        },
        None => SortOrder::default(),
    };
    let filter = params.to_filter(&state.catalog);
    match browse::listing(&state.catalog, &filter, sort) {
        Some(listing) => cached(&state, if_none_match, listing),
        None => error_response(StatusCode::NOT_FOUND, "No movies match these criteria"),
    }
}

async fn movie_detail(
    State(state): State<AppState>,
    if_none_match: Option<TypedHeader<IfNoneMatch>>,
    Path(id): Path<String>,
) -> Response {
    let detail = id
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|id| browse::movie_detail(&state.catalog, id));
    match detail {
        Some(detail) => cached(&state, if_none_match, detail),
        None => error_response(StatusCode::NOT_FOUND, format!("Movie {} not found", id)),
    }
}

async fn genres(
    State(state): State<AppState>,
    if_none_match: Option<TypedHeader<IfNoneMatch>>,
) -> Response {
    let tiles = browse::genre_tiles(&state.catalog);
    cached(&state, if_none_match, tiles)
}

async fn genre_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match browse::genre_page(&state.catalog, &state.enricher, &slug).await {
        Some(page) => Json(page).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("No movies found for genre '{}'", slug),
        ),
    }
}

async fn home(
    State(state): State<AppState>,
    if_none_match: Option<TypedHeader<IfNoneMatch>>,
) -> Response {
    let home = browse::home(&state.catalog);
    cached(&state, if_none_match, home)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
