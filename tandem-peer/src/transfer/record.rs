use bytes::Bytes;
use tandem_core::TransferId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Send,
    Receive,
}

/// Ordered: a record only ever moves to a later status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransferStatus {
    Pending,
    Transferring,
    Completed,
    Error,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

#[derive(Debug, Clone)]
pub struct FileTransferRecord {
    pub id: TransferId,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub total_chunks: u32,
    pub direction: TransferDirection,
    status: TransferStatus,
    progress: u8,
    chunks: Vec<Bytes>,
    payload: Option<Bytes>,
}

impl FileTransferRecord {
    pub fn new(
        id: TransferId,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        total_chunks: u32,
        direction: TransferDirection,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            total_chunks,
            direction,
            status: TransferStatus::Pending,
            progress: 0,
            chunks: Vec::new(),
            payload: None,
        }
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn chunks_received(&self) -> usize {
        self.chunks.len()
    }

    /// Assembled bytes, present once a received transfer completed.
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    pub(crate) fn advance(&mut self, status: TransferStatus) -> bool {
        if status <= self.status || self.status.is_terminal() {
            return false;
        }
        self.status = status;
        if status == TransferStatus::Completed {
            self.progress = 100;
        }
        true
    }

    /// Progress never reaches 100 before completion and never goes back.
    pub(crate) fn record_chunks(&mut self, done: u32) {
        let percent = if self.total_chunks == 0 {
            0
        } else {
            (u64::from(done) * 100 / u64::from(self.total_chunks)).min(99) as u8
        };
        self.progress = self.progress.max(percent);
    }

    pub(crate) fn push_chunk(&mut self, data: Bytes) -> bool {
        if self.chunks.len() >= self.total_chunks as usize {
            return false;
        }
        self.chunks.push(data);
        self.record_chunks(self.chunks.len() as u32);
        true
    }

    pub(crate) fn assemble(&mut self) {
        let mut payload = Vec::with_capacity(self.chunks.iter().map(Bytes::len).sum());
        for chunk in self.chunks.drain(..) {
            payload.extend_from_slice(&chunk);
        }
        self.payload = Some(Bytes::from(payload));
    }
}

pub fn total_chunks(size: u64, chunk_size: usize) -> u32 {
    let chunk_size = chunk_size.max(1) as u64;
    size.div_ceil(chunk_size) as u32
}
