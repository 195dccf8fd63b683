use crate::channel::{DataPipe, FILES_LABEL};
use crate::error::{ChannelError, PeerError, TransferError};
use crate::session::event::{EventSink, LinkEvent};
use crate::session::{ConnectionState, FileSender, Session, SessionNotice};
use crate::transfer::{FileTransferRecord, FlowControl, OutgoingFile, TransferDirection, send_file};
use bytes::Bytes;
use std::sync::Arc;
use tandem_core::{FileFrame, TransferId};
use tokio::sync::mpsc;
use tracing::{info, warn};
use webrtc::data_channel::RTCDataChannel;

impl Session {
    /// Files go out one at a time through a per-link worker, so frames of two transfers never interleave.
    pub(super) fn send_file(
        &mut self,
        name: String,
        mime_type: String,
        data: Bytes,
    ) -> Result<TransferId, PeerError> {
        let flow = FlowControl {
            chunk_size: self.config.chunk_size.max(1),
            high_water_mark: self.config.high_water_mark,
            poll_interval: self.config.backpressure_poll,
        };
        let sink = self.sink(self.epoch);
        let connected = self.current_state() == ConnectionState::Connected;

        let Some(link) = self.link.as_mut().filter(|_| connected) else {
            return Err(ChannelError::NotOpen(FILES_LABEL).into());
        };
        let Some(files) = link.files.clone().filter(|dc| dc.is_open()) else {
            return Err(ChannelError::NotOpen(FILES_LABEL).into());
        };

        let file = OutgoingFile {
            id: TransferId::new(),
            name,
            mime_type,
            data,
        };
        let record = FileTransferRecord::new(
            file.id,
            file.name.clone(),
            file.mime_type.clone(),
            file.data.len() as u64,
            file.total_chunks(flow.chunk_size),
            TransferDirection::Send,
        );

        let sender = link.file_sender.get_or_insert_with(|| {
            let (queue, rx) = mpsc::unbounded_channel();
            let worker = tokio::spawn(run_file_sender(files, flow, sink, rx));
            FileSender { queue, worker }
        });
        let id = file.id;
        info!("Queueing {} ({} bytes) as transfer {}", file.name, file.data.len(), id);
        sender
            .queue
            .send(file)
            .map_err(|_| ChannelError::NotOpen(FILES_LABEL))?;

        self.transfers.begin_send(record);
        self.notify_transfer(id);
        Ok(id)
    }

    pub(super) fn on_chunk_sent(&mut self, id: TransferId, sent: u32) {
        if self.transfers.on_chunk_sent(id, sent) {
            self.notify_transfer(id);
        }
    }

    pub(super) fn on_send_finished(&mut self, id: TransferId, result: Result<(), TransferError>) {
        let ok = match result {
            Ok(()) => true,
            Err(e) => {
                self.report("File transfer failed", &e);
                false
            }
        };
        if self.transfers.on_send_finished(id, ok) {
            self.notify_transfer(id);
        }
    }

    pub(super) fn on_file_text(&mut self, text: &str) {
        let frame = match serde_json::from_str::<FileFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Malformed files frame: {}", e);
                return;
            }
        };
        if let Some(id) = self.transfers.on_frame(frame) {
            self.notify_transfer(id);
        }
    }

    pub(super) fn on_file_data(&mut self, data: Bytes) {
        if let Some(id) = self.transfers.on_binary(data) {
            self.notify_transfer(id);
        }
    }

    fn notify_transfer(&self, id: TransferId) {
        if let Some(record) = self.transfers.get(id) {
            self.notify(SessionNotice::TransferUpdated {
                id,
                direction: record.direction,
                status: record.status(),
                progress: record.progress(),
            });
        }
    }
}

async fn run_file_sender(
    files: Arc<RTCDataChannel>,
    flow: FlowControl,
    sink: EventSink,
    mut queue: mpsc::UnboundedReceiver<OutgoingFile>,
) {
    while let Some(file) = queue.recv().await {
        let id = file.id;
        let result = send_file(files.as_ref(), &file, flow, |sent| {
            sink.emit(LinkEvent::ChunkSent { id, sent })
        })
        .await;
        sink.emit(LinkEvent::SendFinished { id, result });
    }
}
