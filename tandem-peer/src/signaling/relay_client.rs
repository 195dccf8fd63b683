use crate::error::SignalingError;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use reqwest_eventsource::{Event, EventSource, retry};
use tandem_core::{
    ConnectedAck, CreateRoomResponse, RoleQuery, RoomCode, RoomRole, SignalEnvelope,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Something the relay pushed down a room's event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Connected(RoomRole),
    Envelope(SignalEnvelope),
    /// The stream ended: the room expired or the relay went away.
    Closed,
}

/// HTTP client for the room relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    base: Url,
}

impl RelayClient {
    pub fn new(base: &str) -> Result<Self, SignalingError> {
        let mut base =
            Url::parse(base).map_err(|e| SignalingError::Protocol(format!("relay url: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub async fn create_room(&self) -> Result<RoomCode, SignalingError> {
        let response = self
            .http
            .post(self.endpoint("rooms")?)
            .send()
            .await
            .map_err(relay_unreachable)?;
        let body: CreateRoomResponse = check(response)?.json().await.map_err(protocol)?;
        info!("Relay created room {}", body.room);
        Ok(body.room)
    }

    pub async fn join_room(&self, code: &RoomCode) -> Result<(), SignalingError> {
        let response = self
            .http
            .post(self.endpoint(&format!("rooms/{code}/join"))?)
            .send()
            .await
            .map_err(relay_unreachable)?;
        check(response)?;
        Ok(())
    }

    pub async fn send(
        &self,
        code: &RoomCode,
        role: RoomRole,
        envelope: &SignalEnvelope,
    ) -> Result<(), SignalingError> {
        debug!("Relay send {} as {}", envelope.kind(), role);
        let response = self
            .http
            .post(self.endpoint(&format!("rooms/{code}/signal"))?)
            .query(&RoleQuery { role })
            .json(envelope)
            .send()
            .await
            .map_err(relay_unreachable)?;
        check(response)?;
        Ok(())
    }

    /// Best-effort: rooms expire on their own, so a failed leave is only logged.
    pub async fn leave(&self, code: &RoomCode, role: RoomRole) {
        let result = match self.endpoint(&format!("rooms/{code}/leave")) {
            Ok(url) => self
                .http
                .post(url)
                .query(&RoleQuery { role })
                .send()
                .await
                .map(|_| ())
                .map_err(relay_unreachable),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Leaving room {} failed: {}", code, e);
        }
    }

    /// Opens the role's event stream. Events are handed to `on_event` from a background task
    /// until the returned stream is closed or dropped.
    pub async fn subscribe<F>(
        &self,
        code: &RoomCode,
        role: RoomRole,
        on_event: F,
    ) -> Result<RelayStream, SignalingError>
    where
        F: Fn(RelayEvent) + Send + 'static,
    {
        let request = self
            .http
            .get(self.endpoint(&format!("rooms/{code}/events"))?)
            .query(&RoleQuery { role });
        let mut source =
            EventSource::new(request).map_err(|e| SignalingError::Protocol(e.to_string()))?;
        source.set_retry_policy(Box::new(retry::Never));

        // The stream opens or fails with the room's status before anything is handed out.
        match source.next().await {
            Some(Ok(Event::Open)) => {}
            Some(Ok(Event::Message(message))) => {
                return Err(SignalingError::Protocol(format!(
                    "relay sent {} before opening the stream",
                    message.event
                )));
            }
            Some(Err(e)) => return Err(stream_error(e)),
            None => {
                return Err(SignalingError::Unreachable(
                    "event stream closed before opening".into(),
                ));
            }
        }

        let room = code.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = source.next().await {
                match event {
                    Ok(Event::Open) => {}
                    Ok(Event::Message(message)) => {
                        match decode_event(&message.event, &message.data) {
                            Some(event) => on_event(event),
                            None => warn!("Ignoring malformed relay event: {}", message.data),
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => break,
                    Err(e) => {
                        warn!("Event stream for room {} broke: {}", room, e);
                        break;
                    }
                }
            }
            source.close();

            debug!("Event stream for room {} ended", room);
            on_event(RelayEvent::Closed);
        });

        Ok(RelayStream { task })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SignalingError> {
        self.base
            .join(path)
            .map_err(|e| SignalingError::Protocol(format!("bad relay path {path}: {e}")))
    }
}

/// Handle to a live event stream; dropping it closes the stream.
#[derive(Debug)]
pub struct RelayStream {
    task: JoinHandle<()>,
}

impl RelayStream {
    pub fn close(self) {
        self.task.abort();
    }
}

impl Drop for RelayStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Unnamed events arrive as `message`.
fn decode_event(name: &str, data: &str) -> Option<RelayEvent> {
    match name {
        "connected" => serde_json::from_str::<ConnectedAck>(data)
            .ok()
            .map(|ack| RelayEvent::Connected(ack.role)),
        "message" => serde_json::from_str(data).ok().map(RelayEvent::Envelope),
        _ => None,
    }
}

fn check(response: Response) -> Result<Response, SignalingError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(status_error(status))
    }
}

fn status_error(status: StatusCode) -> SignalingError {
    match status {
        StatusCode::NOT_FOUND => SignalingError::RoomNotFound,
        StatusCode::CONFLICT => SignalingError::RoomFull,
        status => SignalingError::Protocol(format!("unexpected relay status {status}")),
    }
}

fn stream_error(e: reqwest_eventsource::Error) -> SignalingError {
    match e {
        reqwest_eventsource::Error::InvalidStatusCode(status, _) => status_error(status),
        reqwest_eventsource::Error::Transport(e) => relay_unreachable(e),
        other => SignalingError::Protocol(other.to_string()),
    }
}

fn relay_unreachable(e: reqwest::Error) -> SignalingError {
    SignalingError::Unreachable(e.to_string())
}

fn protocol(e: reqwest::Error) -> SignalingError {
    SignalingError::Protocol(e.to_string())
}
