use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::state::{BlobSlot, SimState};

pub fn routes() -> Router<SimState> {
    Router::new()
        .route("/api/blobs", post(create_blob))
        .route("/api/blobs/{key}/data", put(put_chunk))
        .route("/api/blobs/{key}", get(get_blob))
}

#[derive(Debug, Deserialize)]
struct CreateBlob {
    size: usize,
}

async fn create_blob(
    State(state): State<SimState>,
    Json(input): Json<CreateBlob>,
) -> (StatusCode, Json<Value>) {
    let key = Uuid::new_v4().to_string();
    state.blobs.lock().unwrap().insert(
        key.clone(),
        BlobSlot {
            expected_size: input.size,
            data: Vec::with_capacity(input.size),
        },
    );
    tracing::debug!(key = %key, size = input.size, "blob created");
    (StatusCode::CREATED, Json(json!({ "key": key })))
}

#[derive(Debug, Deserialize)]
struct ChunkQuery {
    offset: usize,
}

async fn put_chunk(
    State(state): State<SimState>,
    Path(key): Path<String>,
    Query(q): Query<ChunkQuery>,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut blobs = state.blobs.lock().unwrap();
    let slot = blobs.get_mut(&key).ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no such blob: {key}") })),
    ))?;

    // Append-only: each chunk must start where the previous one ended.
    if q.offset != slot.data.len() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!(
                    "chunk offset {} does not match stored length {}",
                    q.offset,
                    slot.data.len()
                )
            })),
        ));
    }
    if slot.data.len() + body.len() > slot.expected_size {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "chunk exceeds declared blob size" })),
        ));
    }

    slot.data.extend_from_slice(&body);
    Ok(StatusCode::NO_CONTENT)
}

async fn get_blob(
    State(state): State<SimState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let blobs = state.blobs.lock().unwrap();
    let slot = blobs.get(&key).ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no such blob: {key}") })),
    ))?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        slot.data.clone(),
    ))
}
