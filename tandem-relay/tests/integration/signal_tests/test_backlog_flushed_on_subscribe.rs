use reqwest::StatusCode;
use tandem_core::{RoomRole, SignalEnvelope};
use tandem_relay::RelayConfig;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_backlog_flushed_on_subscribe() {
    init_tracing();
    let relay = TestRelay::start(RelayConfig::default()).await.unwrap();
    let code = relay.create_room().await.unwrap();

    // Nobody is listening yet; both envelopes have to be kept for the host.
    assert_eq!(relay.join(code.as_str()).await.unwrap(), StatusCode::OK);
    let answer = SignalEnvelope::answer("v=0 answer");
    assert_eq!(
        relay.signal(&code, RoomRole::Guest, &answer).await.unwrap(),
        StatusCode::OK
    );

    let mut host = relay.events(&code, RoomRole::Host).await.unwrap();
    assert_eq!(
        host.next_event().await.unwrap().name.as_deref(),
        Some("connected")
    );
    assert_eq!(
        host.next_envelope().await.unwrap(),
        SignalEnvelope::PeerJoined
    );
    assert_eq!(host.next_envelope().await.unwrap(), answer);
}
