use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use crate::routes::router;
use crate::state::AdminState;

/// Serves the admin HTTP surface until `shutdown` is cancelled.
///
/// Per spec §4.7 the admin surface's failure must not stop the data
/// pipeline: the caller is expected to spawn this as a detached, supervised
/// task and log+continue if it returns an error, rather than propagate it
/// into the rest of the orchestrator's shutdown path.
pub async fn serve(addr: SocketAddr, state: AdminState, shutdown: CancellationToken) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "admin surface listening");

    axum::serve(listener, app).with_graceful_shutdown(async move { shutdown.cancelled().await }).await?;

    tracing::info!("admin surface stopped");
    Ok(())
}
