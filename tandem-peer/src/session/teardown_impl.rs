use crate::session::{LifecycleEvent, Session};
use tracing::{info, warn};

impl Session {
    /// Releases the current link. Chat history and transfer records are kept.
    pub(super) async fn teardown(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };
        info!("Tearing down connection #{}", link.epoch);

        if let Some(sender) = link.file_sender.take() {
            sender.worker.abort();
        }
        self.transfers.interrupt();
        for source in link.media.drain(..) {
            source.stop().await;
        }
        if let Some(room) = link.room.take() {
            room.release();
        }
        link.engine.reset();

        if let Err(e) = link.pc.close().await {
            warn!("Closing peer connection failed: {}", e);
        }
    }

    pub(super) async fn disconnect(&mut self) {
        self.teardown().await;
        self.transition(LifecycleEvent::UserDisconnect);
    }

    pub(super) async fn start_new_session(&mut self) {
        self.disconnect().await;
        self.history.clear();
        self.transfers.clear();
        info!("Started a new session");
    }
}
