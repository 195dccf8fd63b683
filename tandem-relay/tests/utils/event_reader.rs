use anyhow::{Context, Result, bail};
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource, retry};
use std::time::Duration;
use tandem_core::SignalEnvelope;

pub const EVENT_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// `None` for unnamed events.
    pub name: Option<String>,
    pub data: String,
}

/// Server-sent-events reader for one role's stream.
pub struct EventReader {
    source: EventSource,
}

impl EventReader {
    /// Sends the request and waits for the stream to open.
    pub async fn open(request: reqwest::RequestBuilder) -> Result<Self> {
        let mut source = EventSource::new(request)?;
        source.set_retry_policy(Box::new(retry::Never));

        let first = tokio::time::timeout(Duration::from_millis(EVENT_TIMEOUT_MS), source.next())
            .await
            .context("Timed out opening event stream")?;
        match first {
            Some(Ok(Event::Open)) => Ok(Self { source }),
            Some(Ok(Event::Message(message))) => bail!("Event before open: {:?}", message),
            Some(Err(e)) => Err(e).context("Event stream refused"),
            None => bail!("Event stream ended before opening"),
        }
    }

    pub async fn next_event(&mut self) -> Result<RawEvent> {
        tokio::time::timeout(Duration::from_millis(EVENT_TIMEOUT_MS), self.read_event())
            .await
            .context("Timed out waiting for event")?
    }

    pub async fn next_envelope(&mut self) -> Result<SignalEnvelope> {
        let event = self.next_event().await?;
        if event.name.is_some() {
            bail!("Expected a signal envelope, got {:?}", event);
        }
        Ok(serde_json::from_str(&event.data)?)
    }

    /// Resolves once the server closes the stream.
    pub async fn closed(&mut self) -> Result<()> {
        tokio::time::timeout(Duration::from_millis(EVENT_TIMEOUT_MS), async {
            while let Some(event) = self.source.next().await {
                if event.is_err() {
                    break;
                }
            }
        })
        .await
        .context("Event stream stayed open")
    }

    async fn read_event(&mut self) -> Result<RawEvent> {
        loop {
            match self.source.next().await {
                Some(Ok(Event::Open)) => continue,
                Some(Ok(Event::Message(message))) => {
                    let name = (message.event != "message").then_some(message.event);
                    return Ok(RawEvent {
                        name,
                        data: message.data,
                    });
                }
                Some(Err(e)) => return Err(e).context("Event stream broke"),
                None => bail!("Event stream ended"),
            }
        }
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.source.close();
    }
}
