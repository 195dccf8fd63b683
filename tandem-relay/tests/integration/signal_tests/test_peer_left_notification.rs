use tandem_core::{RoomRole, SignalEnvelope};
use tandem_relay::RelayConfig;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_peer_left_notification() {
    init_tracing();
    let relay = TestRelay::start(RelayConfig::default()).await.unwrap();
    let code = relay.create_room().await.unwrap();
    relay.join(code.as_str()).await.unwrap();

    let mut guest = relay.events(&code, RoomRole::Guest).await.unwrap();
    guest.next_event().await.unwrap();

    relay.leave(code.as_str(), RoomRole::Host).await.unwrap();
    assert_eq!(
        guest.next_envelope().await.unwrap(),
        SignalEnvelope::PeerLeft
    );
}
