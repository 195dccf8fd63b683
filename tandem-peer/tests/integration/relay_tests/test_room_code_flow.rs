use crate::integration::init_tracing;
use crate::utils::local_relay::LocalRelay;
use crate::utils::pair::PeerPair;
use crate::utils::waits::{next_chat, wait_for_notice};
use anyhow::Result;
use tandem_peer::{ConnectionState, SessionNotice};
use tandem_core::RoomRole;

#[tokio::test]
async fn test_room_code_flow() -> Result<()> {
    init_tracing();
    let relay = LocalRelay::start().await?;
    let pair = PeerPair::with(|config| config.with_relay(relay.url.clone())).await?;
    let mut host_notices = pair.host.notices();

    let code = pair.host.host_room().await?;
    assert_eq!(pair.host.state(), ConnectionState::Waiting);
    let host = pair.host.snapshot().await?;
    assert_eq!(host.room, Some((code.clone(), RoomRole::Host)));

    // Codes are case-insensitive on the way in.
    pair.guest.join_room(code.as_str().to_lowercase()).await?;
    assert_eq!(pair.guest.state(), ConnectionState::Connecting);

    wait_for_notice(&mut host_notices, "peer joined", |notice| {
        (notice == SessionNotice::PeerJoined).then_some(())
    })
    .await?;

    pair.wait_connected().await?;

    // Both sides dropped the room once connected.
    let host = pair.host.snapshot().await?;
    let guest = pair.guest.snapshot().await?;
    assert_eq!(host.room, None);
    assert_eq!(guest.room, None);

    let mut guest_notices = pair.guest.notices();
    pair.host.send_chat("over the direct link").await?;
    assert_eq!(next_chat(&mut guest_notices).await?.text, "over the direct link");

    Ok(())
}
