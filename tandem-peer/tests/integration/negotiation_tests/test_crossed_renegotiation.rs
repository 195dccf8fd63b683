use crate::integration::init_tracing;
use crate::utils::lan::VirtualLan;
use anyhow::{Context, Result};
use std::sync::Arc;
use tandem_core::DescriptorKind;
use tandem_peer::{NegotiationEngine, PeerConfig, RemoteOutcome, Role};
use webrtc::api::APIBuilder;
use webrtc::api::media_engine::MediaEngine;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::signaling_state::RTCSignalingState;

async fn connection(config: &PeerConfig) -> Result<Arc<RTCPeerConnection>> {
    let mut media_engine = MediaEngine::default();
    media_engine.register_default_codecs()?;
    let setting = config
        .setting_engine
        .as_ref()
        .map(|build| build())
        .unwrap_or_default();

    let api = APIBuilder::new()
        .with_setting_engine(setting)
        .with_media_engine(media_engine)
        .build();
    Ok(Arc::new(
        api.new_peer_connection(RTCConfiguration::default()).await?,
    ))
}

fn answer_of(outcome: RemoteOutcome) -> Result<String> {
    match outcome {
        RemoteOutcome::Answer(answer) => Ok(answer),
        other => anyhow::bail!("expected an answer, got {other:?}"),
    }
}

#[tokio::test]
async fn test_crossed_offers_converge_on_real_connections() -> Result<()> {
    init_tracing();
    let (_lan, configs) = VirtualLan::start(2).await?;
    let host_pc = connection(&configs[0]).await?;
    let guest_pc = connection(&configs[1]).await?;
    host_pc.create_data_channel("chat", None).await?;

    let mut host = NegotiationEngine::new(host_pc.clone());
    let mut guest = NegotiationEngine::new(guest_pc.clone());

    let offer = host.create_offer().await?;
    let answer = guest.accept_offer(&offer).await?;
    host.accept_answer(&answer).await?;
    assert_eq!(host.role(), Some(Role::Impolite));
    assert_eq!(guest.role(), Some(Role::Polite));

    // Both sides renegotiate at once and the offers cross.
    let host_offer = host.renegotiate().await?.context("host offer")?;
    let guest_offer = guest.renegotiate().await?.context("guest offer")?;

    let at_host = host
        .on_remote_description(DescriptorKind::Offer, &guest_offer)
        .await?;
    assert_eq!(at_host, RemoteOutcome::Ignored);

    let at_guest = guest
        .on_remote_description(DescriptorKind::Offer, &host_offer)
        .await?;
    let answer = answer_of(at_guest)?;
    host.on_remote_description(DescriptorKind::Answer, &answer)
        .await?;

    assert_eq!(host_pc.signaling_state(), RTCSignalingState::Stable);
    assert_eq!(guest_pc.signaling_state(), RTCSignalingState::Stable);

    // The polite side's dropped round goes through afterwards.
    assert!(guest.take_retry());
    let retried = guest.renegotiate().await?.context("guest retry")?;
    let answer = answer_of(
        host.on_remote_description(DescriptorKind::Offer, &retried)
            .await?,
    )?;
    guest.accept_answer(&answer).await?;

    assert_eq!(host_pc.signaling_state(), RTCSignalingState::Stable);
    assert_eq!(guest_pc.signaling_state(), RTCSignalingState::Stable);
    assert_eq!(host.role(), Some(Role::Impolite));
    assert_eq!(guest.role(), Some(Role::Polite));

    host_pc.close().await?;
    guest_pc.close().await?;
    Ok(())
}
