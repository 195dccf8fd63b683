use crate::integration::init_tracing;
use crate::utils::lan::VirtualLan;
use crate::utils::local_relay::LocalRelay;
use anyhow::Result;
use tandem_peer::{ConnectionState, PeerConfig, PeerError, Session, SignalingError};

#[tokio::test]
async fn test_unknown_room_is_not_found() -> Result<()> {
    init_tracing();
    let relay = LocalRelay::start().await?;
    let guest = Session::spawn(PeerConfig::default().with_relay(relay.url.clone()));

    let err = guest.join_room("ZZZZZZ").await.unwrap_err();
    assert!(matches!(err, PeerError::Signaling(SignalingError::RoomNotFound)), "{err:?}");
    assert_eq!(guest.state(), ConnectionState::Disconnected);

    let err = guest.join_room("not a code").await.unwrap_err();
    assert!(matches!(err, PeerError::Signaling(SignalingError::RoomNotFound)), "{err:?}");

    Ok(())
}

#[tokio::test]
async fn test_third_peer_finds_room_full() -> Result<()> {
    init_tracing();
    let relay = LocalRelay::start().await?;
    let (_lan, configs) = VirtualLan::start(3).await?;
    let mut sessions = configs
        .into_iter()
        .map(|config| Session::spawn(config.with_relay(relay.url.clone())));
    let (host, guest, third) = match (sessions.next(), sessions.next(), sessions.next()) {
        (Some(host), Some(guest), Some(third)) => (host, guest, third),
        _ => unreachable!("three configs requested"),
    };

    let code = host.host_room().await?;
    guest.join_room(code.as_str()).await?;

    let err = third.join_room(code.as_str()).await.unwrap_err();
    assert!(matches!(err, PeerError::Signaling(SignalingError::RoomFull)), "{err:?}");
    assert_eq!(third.state(), ConnectionState::Disconnected);
    assert!(!third.snapshot().await?.has_connection);

    Ok(())
}

#[tokio::test]
async fn test_room_needs_a_relay() -> Result<()> {
    init_tracing();
    let host = Session::spawn(PeerConfig::default());

    let err = host.host_room().await.unwrap_err();
    assert!(matches!(err, PeerError::Signaling(SignalingError::Unreachable(_))), "{err:?}");
    assert_eq!(host.state(), ConnectionState::Disconnected);

    Ok(())
}
