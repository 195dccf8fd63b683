use reqwest::StatusCode;
use std::time::Duration;
use tandem_core::RoomRole;
use tandem_relay::RelayConfig;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_room_expires() {
    init_tracing();
    let relay = TestRelay::start(RelayConfig {
        room_ttl: Duration::from_millis(300),
        ..RelayConfig::default()
    })
    .await
    .unwrap();
    let code = relay.create_room().await.unwrap();
    let mut host = relay.events(&code, RoomRole::Host).await.unwrap();
    host.next_event().await.unwrap();

    host.closed().await.unwrap();
    assert_eq!(
        relay.join(code.as_str()).await.unwrap(),
        StatusCode::NOT_FOUND
    );
}
