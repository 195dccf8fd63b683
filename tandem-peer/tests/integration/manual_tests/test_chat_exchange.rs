use crate::integration::init_tracing;
use crate::utils::pair::PeerPair;
use crate::utils::waits::next_chat;
use anyhow::Result;
use tandem_peer::MessageSender;

#[tokio::test]
async fn test_chat_exchange() -> Result<()> {
    init_tracing();
    let pair = PeerPair::new().await?;
    pair.connect_manually().await?;

    let mut host_notices = pair.host.notices();
    let mut guest_notices = pair.guest.notices();

    pair.host.send_chat("hi from the host").await?;
    let received = next_chat(&mut guest_notices).await?;
    assert_eq!(received.text, "hi from the host");
    assert_eq!(received.sender, MessageSender::Remote);

    // Text that looks like a renegotiation frame must arrive as plain chat.
    let sneaky = r#"{"frame":"offer","sdp":"v=0"}"#;
    pair.guest.send_chat(sneaky).await?;
    let received = next_chat(&mut host_notices).await?;
    assert_eq!(received.text, sneaky);

    let host = pair.host.snapshot().await?;
    let texts: Vec<_> = host.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hi from the host", sneaky]);
    assert_eq!(host.messages[0].sender, MessageSender::Local);

    Ok(())
}
