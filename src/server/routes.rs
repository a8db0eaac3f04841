use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::data::snapshot::MasterSnapshot;
use crate::decode::{decode_field_record, FieldRecord, FuncType};
use crate::hydrate::{get_entity, HydratedEntity, ReverseData};
use crate::server::api::{
    parse_id, parse_kind, parse_region, DecodeQuery, EntityQuery, HealthResponse, InfoResponse,
    ReloadResponse,
};
use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;

pub const RELOAD_TOKEN_HEADER: &str = "x-atlas-reload-token";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/:region/basic/:kind/:id", get(basic_entity))
        .route("/:region/nice/:kind/:id", get(nice_entity))
        .route("/:region/utils/decode", get(decode_data_vals))
        .route("/:region/info", get(info))
        .route("/:region/reload", post(reload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.registry.regions().collect()))
}

fn snapshot_for(state: &AppState, region: &str) -> ApiResult<Arc<MasterSnapshot>> {
    let region = parse_region(region)?;
    state
        .registry
        .snapshot(region)
        .ok_or_else(|| ApiError::NotFound(format!("region {region} is not served")))
}

async fn basic_entity(
    State(state): State<AppState>,
    Path((region, kind, id)): Path<(String, String, String)>,
    query: Result<Query<EntityQuery>, QueryRejection>,
) -> ApiResult<Json<HydratedEntity>> {
    let Query(query) = query?;
    entity(&state, &region, &kind, &id, ReverseData::Basic, &query).await
}

async fn nice_entity(
    State(state): State<AppState>,
    Path((region, kind, id)): Path<(String, String, String)>,
    query: Result<Query<EntityQuery>, QueryRejection>,
) -> ApiResult<Json<HydratedEntity>> {
    let Query(query) = query?;
    entity(&state, &region, &kind, &id, ReverseData::Nice, &query).await
}

async fn entity(
    state: &AppState,
    region: &str,
    kind: &str,
    id: &str,
    root: ReverseData,
    query: &EntityQuery,
) -> ApiResult<Json<HydratedEntity>> {
    let snapshot = snapshot_for(state, region)?;
    let kind = parse_kind(kind)?;
    let id = parse_id(id)?;
    let ctx = query.context(kind)?;

    // One snapshot for the whole tree, even if a reload lands meanwhile.
    let entity = tokio::task::spawn_blocking(move || get_entity(&snapshot, kind, id, root, ctx))
        .await
        .map_err(|err| ApiError::Internal(format!("hydration task failed: {err}")))??;
    if entity.reverse.is_some() {
        info!(
            kind = %kind,
            id,
            depth = %ctx.depth,
            data = %ctx.data,
            entities = entity.node_count(),
            "reverse tree served"
        );
    }
    Ok(Json(entity))
}

async fn decode_data_vals(
    State(state): State<AppState>,
    Path(region): Path<String>,
    query: Result<Query<DecodeQuery>, QueryRejection>,
) -> ApiResult<Json<FieldRecord>> {
    let Query(query) = query?;
    let snapshot = snapshot_for(&state, &region)?;
    let func_type = query
        .func_type
        .parse::<FuncType>()
        .map_err(ApiError::BadRequest)?;
    // Caller-supplied input, so a decode failure is the caller's error.
    decode_field_record(&query.raw, func_type, snapshot.as_ref())
        .map(Json)
        .map_err(|err| ApiError::BadRequest(err.to_string()))
}

async fn info(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> ApiResult<Json<InfoResponse>> {
    let snapshot = snapshot_for(&state, &region)?;
    Ok(Json(InfoResponse::from_snapshot(&snapshot)))
}

async fn reload(
    State(state): State<AppState>,
    Path(region): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<ReloadResponse>> {
    if let Some(expected) = state.reload_token.as_deref() {
        let provided = headers
            .get(RELOAD_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .trim();
        if provided != expected {
            return Err(ApiError::Unauthorized(format!(
                "invalid or missing {RELOAD_TOKEN_HEADER}"
            )));
        }
    }
    let region = parse_region(&region)?;
    let registry = Arc::clone(&state.registry);
    let snapshot = tokio::task::spawn_blocking(move || registry.reload(region))
        .await
        .map_err(|err| ApiError::Internal(format!("reload task failed: {err}")))??;
    Ok(Json(ReloadResponse {
        status: "ok",
        region,
        generation: snapshot.version().generation,
    }))
}
