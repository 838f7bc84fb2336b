use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::{
    cache::TimeBucketCache,
    dataset::Dataset,
    denylist::DenyList,
    probe::{self, ProbeConfig},
    selector,
    snapshot,
    types::ProbeOutcome,
};

/// Live query results are reused within a ten-minute bucket so repeated page
/// loads do not each trigger a full probe run.
const CACHE_BUCKET: Duration = Duration::from_secs(600);

#[derive(Clone)]
pub struct AppState {
    dataset: Arc<Dataset>,
    deny: Arc<DenyList>,
    config: ProbeConfig,
    snapshot_path: Arc<PathBuf>,
    cache: Arc<RwLock<TimeBucketCache<Vec<ProbeOutcome>>>>,
}

#[derive(Debug, Deserialize)]
pub struct CheckPortsQuery {
    /// Optional single-letter filter: probe only talkers whose sorted name
    /// starts with this letter, keeping one request under its time ceiling.
    pub letter: Option<String>,
}

/// Serve the on-demand query API until the process is stopped.
pub async fn spawn_server(
    bind: &str,
    dataset: Dataset,
    deny: DenyList,
    config: ProbeConfig,
    snapshot_path: PathBuf,
) -> Result<()> {
    let state = AppState {
        dataset: Arc::new(dataset),
        deny: Arc::new(deny),
        config,
        snapshot_path: Arc::new(snapshot_path),
        cache: Arc::new(RwLock::new(TimeBucketCache::new(CACHE_BUCKET))),
    };

    let app = Router::new()
        .route("/api/check-ports", get(check_ports))
        .route("/api/active-talkers", get(active_talkers))
        .with_state(state);

    info!("serving talker status API on http://{bind}");
    axum::serve(tokio::net::TcpListener::bind(bind).await?, app).await?;
    Ok(())
}

/// Probe the (optionally letter-filtered) endpoint set and return every
/// outcome, connectable or not, with error strings preserved.
async fn check_ports(
    State(app): State<AppState>,
    Query(q): Query<CheckPortsQuery>,
) -> impl IntoResponse {
    if app.dataset.talkers.is_empty() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "talker dataset is empty or malformed" })),
        )
            .into_response();
    }

    let letter = match q.letter.as_deref() {
        None => None,
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
                _ => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "letter must be a single ASCII letter" })),
                    )
                        .into_response();
                }
            }
        }
    };

    let cache_key = letter.map(String::from).unwrap_or_default();
    let now = SystemTime::now();
    if let Some(hit) = app.cache.read().await.get(&cache_key, now) {
        return (StatusCode::OK, Json(hit)).into_response();
    }

    let mut endpoints = selector::select(&app.dataset, &app.deny);
    if let Some(letter) = letter {
        endpoints = selector::filter_by_initial(endpoints, letter);
    }

    info!(endpoints = endpoints.len(), letter = ?letter, "on-demand probe run");
    let outcomes = probe::probe_endpoints(&endpoints, &app.config).await;

    app.cache
        .write()
        .await
        .insert(cache_key, outcomes.clone(), SystemTime::now());
    (StatusCode::OK, Json(outcomes)).into_response()
}

/// Serve the last persisted snapshot. Absent artifact (no run yet, or a
/// replace in flight) is 204 so readers can tolerate it; unreadable JSON
/// is a server error. Absence is judged from the read error itself rather
/// than a second filesystem check, which could race the batch writer.
async fn active_talkers(State(app): State<AppState>) -> impl IntoResponse {
    match snapshot::read_snapshot(&app.snapshot_path) {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(err)
            if err
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) =>
        {
            info!("no snapshot artifact yet at {}", app.snapshot_path.display());
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => {
            error!("failed to read snapshot: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "snapshot artifact is unreadable" })),
            )
                .into_response()
        }
    }
}
