//! In-process stand-in for the remote defect-report store.
//!
//! The real store is an external collaborator; this crate implements its
//! wire contract (report procedures, blob storage, health) over
//! in-memory state so the test suite and the TUI's demo mode have
//! something to talk to. Ids are assigned monotonically and timestamps
//! are nanosecond instants, both store-side, matching the contract.

mod routes;
mod state;

pub use state::{InnerSimState, SimState};

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

pub fn build_router(state: SimState) -> Router {
    routes::build_router(state)
}

pub async fn serve(listener: TcpListener) -> Result<()> {
    let app = build_router(SimState::default());
    axum::serve(listener, app).await?;
    Ok(())
}

/// A running sim store bound to an ephemeral port.
pub struct SimStore {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn the sim store on 127.0.0.1:0 for tests. The server task is
/// dropped with the returned handle.
pub async fn spawn_sim_store() -> SimStore {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind sim store");
    let addr = listener.local_addr().expect("sim store addr");
    let base_url = format!("http://{addr}");
    let app = build_router(SimState::default());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("sim store serve");
    });
    SimStore {
        base_url,
        _handle: handle,
    }
}
