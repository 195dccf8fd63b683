use crate::error::{MediaError, PeerError};
use crate::media::MediaSource;
use crate::session::{ConnectionState, Session};
use std::sync::Arc;
use tracing::info;

impl Session {
    /// Adds a local track. On a connected link this fires negotiation-needed, which renegotiates
    /// over the chat channel; before that, the track simply rides along in the first offer.
    pub(super) async fn attach_media(&mut self, source: Arc<dyn MediaSource>) -> Result<(), PeerError> {
        let state = self.current_state();
        if state == ConnectionState::Disconnected {
            return Err(PeerError::Busy(state));
        }
        let link = self.link_mut()?;

        let track = source.open().await?;
        if let Err(e) = link.pc.add_track(track).await {
            source.stop().await;
            return Err(MediaError::Attach(e.to_string()).into());
        }

        info!("Local media track attached");
        link.media.push(source);
        Ok(())
    }
}
