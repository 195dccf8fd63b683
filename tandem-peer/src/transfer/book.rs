use crate::transfer::{FileTransferRecord, TransferDirection, TransferStatus};
use bytes::Bytes;
use tandem_core::{FileFrame, TransferId};
use tracing::{debug, warn};

/// Every transfer of the session, in the order it started.
#[derive(Debug, Default)]
pub struct TransferBook {
    records: Vec<FileTransferRecord>,
    /// Receive transfer named by the last chunk descriptor; the next binary frame is its payload.
    expecting: Option<TransferId>,
}

impl TransferBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[FileTransferRecord] {
        &self.records
    }

    pub fn get(&self, id: TransferId) -> Option<&FileTransferRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.expecting = None;
    }

    /// Forgets the pending chunk descriptor when the `files` channel goes away.
    pub fn interrupt(&mut self) {
        self.expecting = None;
    }

    pub fn begin_send(&mut self, record: FileTransferRecord) -> TransferId {
        let id = record.id;
        self.records.push(record);
        id
    }

    pub fn on_chunk_sent(&mut self, id: TransferId, sent: u32) -> bool {
        let Some(record) = self.find_mut(id, TransferDirection::Send) else {
            return false;
        };
        record.advance(TransferStatus::Transferring);
        record.record_chunks(sent);
        true
    }

    pub fn on_send_finished(&mut self, id: TransferId, ok: bool) -> bool {
        let Some(record) = self.find_mut(id, TransferDirection::Send) else {
            return false;
        };
        record.advance(if ok {
            TransferStatus::Completed
        } else {
            TransferStatus::Error
        })
    }

    /// Applies a control frame from the `files` channel. Returns the transfer it touched.
    pub fn on_frame(&mut self, frame: FileFrame) -> Option<TransferId> {
        match frame {
            FileFrame::Meta {
                id,
                name,
                mime_type,
                size,
                total_chunks,
            } => {
                if self.get(id).is_some() {
                    warn!("Duplicate metadata for transfer {}", id);
                    return None;
                }
                debug!("Incoming file {} ({} bytes, {} chunks)", name, size, total_chunks);
                self.records.push(FileTransferRecord::new(
                    id,
                    name,
                    mime_type,
                    size,
                    total_chunks,
                    TransferDirection::Receive,
                ));
                Some(id)
            }

            FileFrame::Chunk { id, .. } => {
                let Some(record) = self.find_mut(id, TransferDirection::Receive) else {
                    warn!("Chunk descriptor for unknown transfer {}", id);
                    return None;
                };
                record.advance(TransferStatus::Transferring);
                self.expecting = Some(id);
                Some(id)
            }

            FileFrame::Complete { id } => {
                let Some(record) = self.find_mut(id, TransferDirection::Receive) else {
                    warn!("Completion for unknown transfer {}", id);
                    return None;
                };
                if record.status().is_terminal() {
                    return None;
                }
                if record.chunks_received() != record.total_chunks as usize {
                    warn!(
                        "Transfer {} completed with {} of {} chunks",
                        id,
                        record.chunks_received(),
                        record.total_chunks
                    );
                }
                record.assemble();
                record.advance(TransferStatus::Completed);
                Some(id)
            }
        }
    }

    /// Binary frames carry no id: each one belongs to the transfer of the chunk descriptor before it.
    pub fn on_binary(&mut self, data: Bytes) -> Option<TransferId> {
        let Some(id) = self.expecting.take() else {
            warn!("Dropping {} bytes with no chunk descriptor", data.len());
            return None;
        };
        let Some(record) = self
            .find_mut(id, TransferDirection::Receive)
            .filter(|r| r.status() == TransferStatus::Transferring)
        else {
            warn!("Dropping {} bytes for transfer {} no longer in progress", data.len(), id);
            return None;
        };

        if !record.push_chunk(data) {
            warn!(
                "Dropping extra chunk for transfer {}: already have {}",
                record.id, record.total_chunks
            );
            return None;
        }
        Some(record.id)
    }

    fn find_mut(
        &mut self,
        id: TransferId,
        direction: TransferDirection,
    ) -> Option<&mut FileTransferRecord> {
        self.records
            .iter_mut()
            .find(|r| r.id == id && r.direction == direction)
    }
}
