use tandem_core::{ConnectedAck, RoomRole};
use tandem_relay::RelayConfig;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_connected_ack() {
    init_tracing();
    let relay = TestRelay::start(RelayConfig::default()).await.unwrap();
    let code = relay.create_room().await.unwrap();

    let mut guest = relay.events(&code, RoomRole::Guest).await.unwrap();
    let event = guest.next_event().await.unwrap();

    assert_eq!(event.name.as_deref(), Some("connected"));
    let ack: ConnectedAck = serde_json::from_str(&event.data).unwrap();
    assert_eq!(ack.role, RoomRole::Guest);
}

#[tokio::test]
async fn test_events_for_missing_room_are_rejected() {
    init_tracing();
    let relay = TestRelay::start(RelayConfig::default()).await.unwrap();

    let status = relay
        .http
        .get(format!("{}/rooms/QQQQQQ/events", relay.base))
        .query(&[("role", "host")])
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
}
