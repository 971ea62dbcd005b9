pub mod blobs;
pub mod health;
pub mod reports;

use axum::Router;

use crate::state::SimState;

pub fn build_router(state: SimState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(reports::routes())
        .merge(blobs::routes())
        .with_state(state)
}
