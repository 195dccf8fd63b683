use anyhow::{Context, Result, bail};
use std::time::Duration;
use tandem_peer::{ChatMessage, SessionHandle, SessionNotice, SessionSnapshot};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

pub const STEP_TIMEOUT: Duration = Duration::from_secs(20);

/// Polls snapshots until `done` holds.
pub async fn wait_for_snapshot<F>(
    handle: &SessionHandle,
    what: &str,
    done: F,
) -> Result<SessionSnapshot>
where
    F: Fn(&SessionSnapshot) -> bool,
{
    tokio::time::timeout(STEP_TIMEOUT, async {
        loop {
            let snapshot = handle.snapshot().await?;
            if done(&snapshot) {
                return Ok(snapshot);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .with_context(|| format!("Timed out waiting for {what}"))?
}

/// Skips notices until one matches `pick`.
pub async fn wait_for_notice<T, F>(
    notices: &mut broadcast::Receiver<SessionNotice>,
    what: &str,
    pick: F,
) -> Result<T>
where
    F: Fn(SessionNotice) -> Option<T>,
{
    tokio::time::timeout(STEP_TIMEOUT, async {
        loop {
            match notices.recv().await {
                Ok(notice) => {
                    if let Some(found) = pick(notice) {
                        return Ok(found);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Notice receiver lagged by {}", skipped);
                }
                Err(RecvError::Closed) => bail!("Session closed while waiting for {what}"),
            }
        }
    })
    .await
    .with_context(|| format!("Timed out waiting for {what}"))?
}

pub async fn next_chat(
    notices: &mut broadcast::Receiver<SessionNotice>,
) -> Result<ChatMessage> {
    wait_for_notice(notices, "a chat message", |notice| match notice {
        SessionNotice::ChatReceived(message) => Some(message),
        _ => None,
    })
    .await
}
