use crate::integration::init_tracing;
use crate::utils::pair::PeerPair;
use anyhow::Result;
use tandem_peer::{ConnectionState, Role};

#[tokio::test]
async fn test_manual_handshake() -> Result<()> {
    init_tracing();
    let pair = PeerPair::new().await?;

    let offer = pair.host.host_manual().await?;
    assert_eq!(pair.host.state(), ConnectionState::Waiting);
    assert!(offer.link.query().is_some_and(|q| q.starts_with("d=")));

    let answer = pair.guest.join_manual(offer.link.as_str()).await?;
    assert_eq!(pair.guest.state(), ConnectionState::Connecting);

    pair.host.accept_answer(answer.token).await?;
    pair.wait_connected().await?;

    let host = pair.host.snapshot().await?;
    let guest = pair.guest.snapshot().await?;
    assert_eq!(host.role, Some(Role::Impolite));
    assert_eq!(guest.role, Some(Role::Polite));
    assert!(host.room.is_none() && guest.room.is_none());

    Ok(())
}
