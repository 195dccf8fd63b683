use crate::integration::init_tracing;
use crate::utils::pair::PeerPair;
use anyhow::Result;
use tandem_peer::{ConnectionState, DescriptionError, PeerError};

#[tokio::test]
async fn test_garbage_offer_leaves_guest_idle() -> Result<()> {
    init_tracing();
    let pair = PeerPair::new().await?;

    let err = pair.guest.join_manual("definitely not a token").await.unwrap_err();
    assert!(matches!(err, PeerError::Description(_)), "{err:?}");
    assert_eq!(pair.guest.state(), ConnectionState::Disconnected);
    assert!(!pair.guest.snapshot().await?.has_connection);

    Ok(())
}

#[tokio::test]
async fn test_wrong_kind_answer_keeps_host_waiting() -> Result<()> {
    init_tracing();
    let pair = PeerPair::new().await?;

    let offer = pair.host.host_manual().await?;
    let err = pair.host.accept_answer(offer.token.clone()).await.unwrap_err();
    assert!(
        matches!(err, PeerError::Description(DescriptionError::InvalidDescription(_))),
        "{err:?}"
    );
    assert_eq!(pair.host.state(), ConnectionState::Waiting);

    // The original offer is still good.
    let answer = pair.guest.join_manual(offer.token).await?;
    pair.host.accept_answer(answer.link.as_str()).await?;
    pair.wait_connected().await?;

    Ok(())
}

#[tokio::test]
async fn test_answer_without_hosting_is_rejected() -> Result<()> {
    init_tracing();
    let pair = PeerPair::new().await?;

    let err = pair.host.accept_answer("anything").await.unwrap_err();
    assert!(matches!(err, PeerError::Busy(ConnectionState::Disconnected)), "{err:?}");

    pair.host.host_manual().await?;
    let err = pair.host.host_manual().await.unwrap_err();
    assert!(matches!(err, PeerError::Busy(ConnectionState::Waiting)), "{err:?}");

    Ok(())
}
