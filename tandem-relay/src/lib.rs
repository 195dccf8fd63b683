//! Rendezvous relay: pairs a host and a guest under a short room code and
//! forwards their signaling envelopes until they are connected directly.

mod config;
mod room;
mod signaling;

pub use config::*;
pub use room::*;
pub use signaling::*;

use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Binds `config.bind` and serves until `shutdown` resolves.
pub async fn run<F>(config: RelayConfig, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.bind).await?;
    serve_with_shutdown(listener, RelayService::new(config), shutdown).await
}

pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    service: RelayService,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Relay listening on http://{}", addr);
    }
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}
