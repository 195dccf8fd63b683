use anyhow::{Context, Result};
use tandem_relay::{RelayConfig, RelayService, serve_with_shutdown};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// In-process relay on an ephemeral port, stopped when dropped.
pub struct LocalRelay {
    pub url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl LocalRelay {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind relay listener")?;
        let url = format!("http://{}", listener.local_addr()?);

        let (tx, rx) = oneshot::channel::<()>();
        let service = RelayService::new(RelayConfig::default());
        tokio::spawn(async move {
            let _ = serve_with_shutdown(listener, service, async {
                let _ = rx.await;
            })
            .await;
        });

        Ok(Self {
            url,
            shutdown: Some(tx),
        })
    }
}

impl Drop for LocalRelay {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
