use crate::integration::init_tracing;
use crate::utils::pair::PeerPair;
use crate::utils::waits::next_chat;
use anyhow::Result;
use tandem_peer::ConnectionState;

#[tokio::test]
async fn test_start_new_session_forgets_everything() -> Result<()> {
    init_tracing();
    let pair = PeerPair::new().await?;
    pair.connect_manually().await?;

    let mut host_notices = pair.host.notices();
    pair.guest.send_chat("first round").await?;
    next_chat(&mut host_notices).await?;

    pair.host.start_new_session().await?;
    let host = pair.host.snapshot().await?;
    assert_eq!(host.state, ConnectionState::Disconnected);
    assert!(host.messages.is_empty());
    assert!(host.transfers.is_empty());

    // A fresh round works from the same handles.
    pair.guest.start_new_session().await?;
    pair.connect_manually().await?;
    pair.guest.send_chat("second round").await?;
    assert_eq!(next_chat(&mut host_notices).await?.text, "second round");
    assert_eq!(pair.host.snapshot().await?.messages.len(), 1);

    Ok(())
}
