use crate::channel::{DataPipe, send_file_frame};
use crate::error::{ChannelError, TransferError};
use crate::transfer::total_chunks;
use bytes::Bytes;
use std::time::Duration;
use tandem_core::{FileFrame, TransferId};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct FlowControl {
    pub chunk_size: usize,
    /// Sending pauses while more than this many bytes are queued on the channel.
    pub high_water_mark: usize,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct OutgoingFile {
    pub id: TransferId,
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl OutgoingFile {
    pub fn total_chunks(&self, chunk_size: usize) -> u32 {
        total_chunks(self.data.len() as u64, chunk_size)
    }
}

/// Streams one file: metadata, then a descriptor plus raw bytes per chunk, then completion.
/// `on_chunk` is told how many chunks have gone out so far.
pub async fn send_file<P, F>(
    pipe: &P,
    file: &OutgoingFile,
    flow: FlowControl,
    mut on_chunk: F,
) -> Result<(), TransferError>
where
    P: DataPipe + ?Sized,
    F: FnMut(u32),
{
    let id = file.id;
    let fail = |source: ChannelError| TransferError::Channel { id, source };
    let chunk_size = flow.chunk_size.max(1);
    let total = file.total_chunks(chunk_size);

    send_file_frame(
        pipe,
        &FileFrame::Meta {
            id,
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.data.len() as u64,
            total_chunks: total,
        },
    )
    .await
    .map_err(fail)?;

    for index in 0..total {
        let start = index as usize * chunk_size;
        let end = (start + chunk_size).min(file.data.len());

        wait_for_drain(pipe, flow).await.map_err(fail)?;
        send_file_frame(
            pipe,
            &FileFrame::Chunk {
                id,
                chunk_index: index,
                total_chunks: total,
            },
        )
        .await
        .map_err(fail)?;
        pipe.send_binary(file.data.slice(start..end))
            .await
            .map_err(fail)?;

        on_chunk(index + 1);
    }

    send_file_frame(pipe, &FileFrame::Complete { id })
        .await
        .map_err(fail)?;
    debug!("Sent {} in {} chunks", file.name, total);
    Ok(())
}

async fn wait_for_drain<P>(pipe: &P, flow: FlowControl) -> Result<(), ChannelError>
where
    P: DataPipe + ?Sized,
{
    while pipe.buffered_amount().await > flow.high_water_mark {
        if !pipe.is_open() {
            return Err(ChannelError::NotOpen(pipe.role().label()));
        }
        tokio::time::sleep(flow.poll_interval).await;
    }
    Ok(())
}
