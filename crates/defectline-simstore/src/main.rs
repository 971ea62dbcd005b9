use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let bind = std::env::var("DEFECTLINE_BIND").unwrap_or_else(|_| "127.0.0.1".into());
    let port: u16 = std::env::var("DEFECTLINE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3620);

    let addr = SocketAddr::new(bind.parse()?, port);
    let listener = TcpListener::bind(addr).await?;
    eprintln!("defectline-simstore listening on http://{addr}");

    defectline_simstore::serve(listener).await
}
