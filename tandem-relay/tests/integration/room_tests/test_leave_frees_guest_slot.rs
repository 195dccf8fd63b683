use reqwest::StatusCode;
use tandem_core::RoomRole;
use tandem_relay::RelayConfig;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_leave_frees_guest_slot() {
    init_tracing();
    let relay = TestRelay::start(RelayConfig::default()).await.unwrap();
    let code = relay.create_room().await.unwrap();

    assert_eq!(relay.join(code.as_str()).await.unwrap(), StatusCode::OK);
    assert_eq!(
        relay.leave(code.as_str(), RoomRole::Guest).await.unwrap(),
        StatusCode::OK
    );
    assert_eq!(relay.join(code.as_str()).await.unwrap(), StatusCode::OK);
}

#[tokio::test]
async fn test_leave_unknown_room_succeeds() {
    init_tracing();
    let relay = TestRelay::start(RelayConfig::default()).await.unwrap();

    assert_eq!(
        relay.leave("QQQQQQ", RoomRole::Host).await.unwrap(),
        StatusCode::OK
    );
}
