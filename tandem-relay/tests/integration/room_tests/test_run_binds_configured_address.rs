use reqwest::{Client, StatusCode};
use std::net::SocketAddr;
use std::time::Duration;
use tandem_relay::RelayConfig;
use tokio::sync::oneshot;

use crate::integration::init_tracing;

#[tokio::test]
async fn test_run_binds_configured_address() {
    init_tracing();
    let bind: SocketAddr = {
        let spare = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        spare.local_addr().unwrap()
    };
    let (tx, rx) = oneshot::channel::<()>();
    let server = tokio::spawn(tandem_relay::run(
        RelayConfig {
            bind,
            ..RelayConfig::default()
        },
        async move {
            let _ = rx.await;
        },
    ));

    let http = Client::new();
    let status = tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            if let Ok(response) = http.post(format!("http://{bind}/rooms")).send().await {
                return response.status();
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);

    drop(http);
    tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
