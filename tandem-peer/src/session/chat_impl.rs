use crate::channel::{CHAT_LABEL, DataPipe};
use crate::error::{ChannelError, PeerError};
use crate::history::{ChatMessage, now_millis};
use crate::negotiation::RemoteOutcome;
use crate::session::{ConnectionState, Session, SessionNotice};
use tandem_core::{ChannelFrame, DescriptorKind, InboundChat, MessageId};
use tracing::{debug, info, warn};

impl Session {
    pub(super) async fn send_chat(&mut self, text: String) -> Result<(), PeerError> {
        if self.current_state() != ConnectionState::Connected {
            return Err(ChannelError::NotOpen(CHAT_LABEL).into());
        }

        let message = ChatMessage::local(text);
        self.send_frame(ChannelFrame::Text {
            id: message.id,
            text: message.text.clone(),
            timestamp: message.timestamp,
        })
        .await?;
        self.history.push(message);
        Ok(())
    }

    /// Frames sent while the chat channel is still opening are queued and flushed on open.
    pub(super) async fn send_frame(&mut self, frame: ChannelFrame) -> Result<(), PeerError> {
        let text = frame.encode().map_err(|e| ChannelError::Send {
            label: CHAT_LABEL,
            reason: e.to_string(),
        })?;
        let link = self.link_mut()?;

        match link.chat.as_ref() {
            Some(chat) if chat.is_open() => {
                DataPipe::send_text(chat.as_ref(), text).await?;
            }
            _ => {
                debug!("Chat channel not open yet; queueing frame");
                link.pending_chat.push(text);
            }
        }
        Ok(())
    }

    pub(super) async fn flush_pending_chat(&mut self) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        let Some(chat) = link.chat.clone().filter(|dc| dc.is_open()) else {
            return;
        };

        let queued = std::mem::take(&mut link.pending_chat);
        if !queued.is_empty() {
            info!("Flushing {} queued chat frames", queued.len());
        }
        for text in queued {
            if let Err(e) = DataPipe::send_text(chat.as_ref(), text).await {
                self.report("Queued chat frame not sent", &e);
            }
        }
    }

    pub(super) async fn on_chat_text(&mut self, raw: String) {
        match ChannelFrame::decode(&raw) {
            InboundChat::Literal(text) => {
                self.receive_chat(ChatMessage::remote(MessageId::new(), text, now_millis()))
            }
            InboundChat::Frame(ChannelFrame::Text {
                id,
                text,
                timestamp,
            }) => self.receive_chat(ChatMessage::remote(id, text, timestamp)),
            InboundChat::Frame(ChannelFrame::Offer { sdp }) => {
                self.on_remote_renegotiation(DescriptorKind::Offer, &sdp)
                    .await
            }
            InboundChat::Frame(ChannelFrame::Answer { sdp }) => {
                self.on_remote_renegotiation(DescriptorKind::Answer, &sdp)
                    .await
            }
            InboundChat::Frame(ChannelFrame::Candidate { candidate }) => {
                let Some(link) = self.link.as_mut() else {
                    return;
                };
                if let Err(e) = link.engine.apply_candidate(candidate).await {
                    warn!("Renegotiation candidate rejected: {}", e);
                }
            }
        }
    }

    fn receive_chat(&mut self, message: ChatMessage) {
        debug!("Chat message {} received", message.id);
        self.history.push(message.clone());
        self.notify(SessionNotice::ChatReceived(message));
    }

    async fn on_remote_renegotiation(&mut self, kind: DescriptorKind, sdp: &str) {
        let Some(link) = self.link.as_mut() else {
            return;
        };

        let outcome = link.engine.on_remote_description(kind, sdp).await;
        let result = match outcome {
            Ok(RemoteOutcome::Answer(answer)) => {
                self.send_frame(ChannelFrame::Answer { sdp: answer }).await
            }
            Ok(RemoteOutcome::Applied | RemoteOutcome::Ignored) => Ok(()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            self.report("Renegotiation failed", &e);
            return;
        }

        // A round of ours lost a collision or waited behind this one.
        if self.link.as_mut().is_some_and(|link| link.engine.take_retry()) {
            self.renegotiate().await;
        }
    }
}
