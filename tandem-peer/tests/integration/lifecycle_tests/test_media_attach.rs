use crate::integration::init_tracing;
use crate::utils::pair::PeerPair;
use crate::utils::waits::{STEP_TIMEOUT, next_chat, wait_for_notice};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tandem_peer::{ConnectionState, MediaError, MediaSource, PeerError, SessionNotice};
use webrtc::api::media_engine::MIME_TYPE_VP8;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

struct DeniedCamera;

#[async_trait]
impl MediaSource for DeniedCamera {
    async fn open(&self) -> Result<Arc<dyn TrackLocal + Send + Sync>, MediaError> {
        Err(MediaError::PermissionDenied)
    }

    async fn stop(&self) {}
}

/// Hands out one static VP8 track and remembers whether it was stopped.
struct FakeCamera {
    track: Arc<TrackLocalStaticSample>,
    stopped: AtomicBool,
}

impl FakeCamera {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            track: Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    ..Default::default()
                },
                "camera".to_owned(),
                "tandem".to_owned(),
            )),
            stopped: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl MediaSource for FakeCamera {
    async fn open(&self) -> Result<Arc<dyn TrackLocal + Send + Sync>, MediaError> {
        Ok(self.track.clone())
    }

    async fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_denied_camera_surfaces_media_error() -> Result<()> {
    init_tracing();
    let pair = PeerPair::new().await?;

    let err = pair.host.attach_media(Arc::new(DeniedCamera)).await.unwrap_err();
    assert!(matches!(err, PeerError::Busy(ConnectionState::Disconnected)), "{err:?}");

    pair.host.host_manual().await?;
    let err = pair.host.attach_media(Arc::new(DeniedCamera)).await.unwrap_err();
    assert!(matches!(err, PeerError::Media(MediaError::PermissionDenied)), "{err:?}");
    assert_eq!(pair.host.state(), ConnectionState::Waiting);

    Ok(())
}

#[tokio::test]
async fn test_media_attach_renegotiates() -> Result<()> {
    init_tracing();
    let pair = PeerPair::new().await?;
    pair.connect_manually().await?;
    let mut guest_notices = pair.guest.notices();

    let camera = FakeCamera::new();
    pair.host.attach_media(camera.clone()).await?;

    // Samples are dropped until the renegotiated track is bound, so keep feeding.
    let track = camera.track.clone();
    let feeder = tokio::spawn(async move {
        loop {
            let _ = track
                .write_sample(&Sample {
                    data: Bytes::from_static(&[0u8; 64]),
                    duration: Duration::from_millis(20),
                    ..Default::default()
                })
                .await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let kind = wait_for_notice(&mut guest_notices, "remote track", |notice| match notice {
        SessionNotice::RemoteTrack { kind, .. } => Some(kind),
        _ => None,
    })
    .await;
    feeder.abort();
    assert_eq!(kind?, "video");

    // Chat still flows after the renegotiation round.
    pair.host.send_chat("still here").await?;
    assert_eq!(next_chat(&mut guest_notices).await?.text, "still here");
    assert_eq!(pair.guest.state(), ConnectionState::Connected);

    pair.host.disconnect().await?;
    assert!(camera.stopped.load(Ordering::SeqCst));
    assert!(
        pair.guest
            .wait_for_state(ConnectionState::Disconnected, STEP_TIMEOUT)
            .await
    );

    Ok(())
}
