use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use gradboard_core::{record_query, record_rejected};
use gradboard_leaderboard::{Column, Leaderboard, QueryParams, QueryResult, SortKey, COLUMNS};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{instrument, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct AppState {
    board: Leaderboard,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub search: Option<String>,
    pub region: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub sort_key: SortKey,
    pub sort_label: &'static str,
    /// Rows in the whole snapshot, before filtering.
    pub total: usize,
    #[serde(flatten)]
    pub result: QueryResult,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct SortKeyOption {
    id: &'static str,
    label: &'static str,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn router(board: Leaderboard) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/regions", get(regions))
        .route("/api/columns", get(columns))
        .route("/api/sort-keys", get(sort_keys))
        .with_state(AppState { board })
}

async fn index() -> Html<&'static str> { Html(INDEX_HTML) }

#[instrument(skip_all, fields(search = ?q.search, region = ?q.region, sort = ?q.sort))]
async fn leaderboard(State(state): State<AppState>, Query(q): Query<LeaderboardQuery>) -> Result<Json<LeaderboardResponse>, ApiError> {
    let params = QueryParams::from_request(q.search.as_deref(), q.region.as_deref(), q.sort.as_deref()).map_err(|err| {
        record_rejected("invalid_sort_key");
        warn!(error = %err, "query_rejected");
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { code: "ERR_INVALID_ARGUMENT", message: err.to_string() }))
    })?;
    let started = Instant::now();
    let result = state.board.query(&params);
    record_query(params.sort_key.id(), started.elapsed(), result.rows.len());
    Ok(Json(LeaderboardResponse {
        sort_key: params.sort_key,
        sort_label: params.sort_key.label(),
        total: state.board.len(),
        result,
    }))
}

async fn regions(State(state): State<AppState>) -> Json<Vec<String>> { Json(state.board.region_options()) }

async fn columns() -> Json<Vec<Column>> { Json(COLUMNS.to_vec()) }

async fn sort_keys() -> Json<Vec<SortKeyOption>> {
    Json(SortKey::ALL.into_iter().map(|k| SortKeyOption { id: k.id(), label: k.label() }).collect())
}
