use crate::error::MediaError;
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// A capture device as far as the session cares: something that yields a track and can be stopped.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn open(&self) -> Result<Arc<dyn TrackLocal + Send + Sync>, MediaError>;

    async fn stop(&self);
}
