use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tandem_core::{CreateRoomResponse, RoomCode, RoomRole, SignalEnvelope};
use tandem_relay::{RelayConfig, RelayService, serve_with_shutdown};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::event_reader::EventReader;

/// A relay bound to an ephemeral local port, stopped when dropped.
pub struct TestRelay {
    pub base: String,
    pub http: Client,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestRelay {
    pub async fn start(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind relay listener")?;
        let base = format!("http://{}", listener.local_addr()?);

        let (tx, rx) = oneshot::channel::<()>();
        let service = RelayService::new(config);
        tokio::spawn(async move {
            let _ = serve_with_shutdown(listener, service, async {
                let _ = rx.await;
            })
            .await;
        });

        Ok(Self {
            base,
            http: Client::new(),
            shutdown: Some(tx),
        })
    }

    pub async fn create_room(&self) -> Result<RoomCode> {
        let response: CreateRoomResponse = self
            .http
            .post(format!("{}/rooms", self.base))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.room)
    }

    pub async fn join(&self, code: &str) -> Result<StatusCode> {
        let response = self
            .http
            .post(format!("{}/rooms/{}/join", self.base, code))
            .send()
            .await?;
        Ok(response.status())
    }

    pub async fn signal(
        &self,
        code: &RoomCode,
        role: RoomRole,
        envelope: &SignalEnvelope,
    ) -> Result<StatusCode> {
        let response = self
            .http
            .post(format!("{}/rooms/{}/signal", self.base, code))
            .query(&[("role", role.as_str())])
            .json(envelope)
            .send()
            .await?;
        Ok(response.status())
    }

    pub async fn leave(&self, code: &str, role: RoomRole) -> Result<StatusCode> {
        let response = self
            .http
            .post(format!("{}/rooms/{}/leave", self.base, code))
            .query(&[("role", role.as_str())])
            .send()
            .await?;
        Ok(response.status())
    }

    pub async fn events(&self, code: &RoomCode, role: RoomRole) -> Result<EventReader> {
        let request = self
            .http
            .get(format!("{}/rooms/{}/events", self.base, code))
            .query(&[("role", role.as_str())]);
        EventReader::open(request).await
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
