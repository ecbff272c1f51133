use embedded_io::{Error as _, Read, Seek, SeekFrom};
use heapless::String;

use super::{wav, AssetFile, AssetStore, AudioDevice, StreamError};
use crate::config::{PcmFormat, StreamConfig, ASSET_PATH_MAX, STREAM_CHUNK_BYTES};
use crate::scale::ScaleIndex;

/// Outcome of a note that streamed to completion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlaybackReport {
    pub index: ScaleIndex,
    pub bytes_streamed: u32,
    pub chunks: u32,
    pub format: PcmFormat,
}

/// Copies one note asset at a time into the output device.
///
/// The device is stopped for the duration of a stream and started again on
/// every exit path once it was stopped.
pub struct SampleStreamer<S, D> {
    store: S,
    device: D,
    config: StreamConfig,
    notes: &'static [&'static str],
    buffer: [u8; STREAM_CHUNK_BYTES],
}

impl<S, D> SampleStreamer<S, D>
where
    S: AssetStore,
    D: AudioDevice,
{
    pub fn new(store: S, device: D, config: StreamConfig, notes: &'static [&'static str]) -> Self {
        Self {
            store,
            device,
            config,
            notes,
            buffer: [0; STREAM_CHUNK_BYTES],
        }
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn release(self) -> (S, D) {
        (self.store, self.device)
    }

    pub fn play(&mut self, index: ScaleIndex) -> Result<PlaybackReport, StreamError> {
        let Some(note) = self.notes.get(index.get()).copied() else {
            log::error!(
                "stream: rejected index={} notes={}",
                index.get(),
                self.notes.len()
            );
            return Err(StreamError::InvalidIndex {
                index: index.get(),
                len: self.notes.len(),
            });
        };

        self.device.stop();

        let Some(path) = asset_path(self.config.asset_root, note) else {
            log::warn!(
                "stream: path_overflow root={} note={}",
                self.config.asset_root,
                note
            );
            self.device.start();
            return Err(StreamError::AssetNotFound);
        };

        let mut asset = match self.store.open(&path) {
            Ok(asset) => asset,
            Err(err) => {
                log::warn!("stream: open_failed path={} err={:?}", path.as_str(), err);
                self.device.start();
                return Err(StreamError::AssetNotFound);
            }
        };

        let result = stream_payload(
            &mut asset,
            &mut self.device,
            &mut self.buffer,
            self.config.expected_format,
            index,
        );

        self.device.start();
        asset.close();

        match &result {
            Ok(report) => log::info!(
                "stream: played note={} index={} bytes={} chunks={}",
                note,
                index.get(),
                report.bytes_streamed,
                report.chunks
            ),
            Err(err) => log::warn!(
                "stream: aborted note={} index={} err={} streamed={}",
                note,
                index.get(),
                err.as_str(),
                err.bytes_streamed()
            ),
        }
        result
    }
}

/// Joins the asset root and note name, `None` when it would not fit.
pub fn asset_path(root: &str, note: &str) -> Option<String<ASSET_PATH_MAX>> {
    let mut path = String::new();
    path.push_str(root).ok()?;
    if !root.ends_with('/') {
        path.push('/').ok()?;
    }
    path.push_str(note).ok()?;
    Some(path)
}

fn stream_payload<A, D>(
    asset: &mut A,
    device: &mut D,
    buffer: &mut [u8],
    expected: Option<PcmFormat>,
    index: ScaleIndex,
) -> Result<PlaybackReport, StreamError>
where
    A: Read + Seek,
    D: AudioDevice,
{
    let header = wav::parse_header(asset).map_err(|err| {
        log::warn!("stream: bad_header index={} err={}", index.get(), err);
        StreamError::AssetParseError(err)
    })?;

    if let Some(expected) = expected {
        if expected != header.format {
            log::warn!(
                "stream: format_mismatch index={} channels={} rate={} bits={}",
                index.get(),
                header.format.channels,
                header.format.sample_rate,
                header.format.bits_per_sample
            );
        }
    }

    let mut bytes_streamed = 0u32;
    let mut chunks = 0u32;

    if let Err(err) = asset.seek(SeekFrom::Start(u64::from(header.payload_offset))) {
        log::warn!("stream: seek_failed kind={:?}", err.kind());
        return Err(StreamError::ReadError { bytes_streamed });
    }

    let mut remaining = header.payload_length as usize;
    while remaining > 0 {
        let want = remaining.min(buffer.len());
        let read = match asset.read(&mut buffer[..want]) {
            Ok(0) => {
                log::warn!(
                    "stream: short_payload streamed={} remaining={}",
                    bytes_streamed,
                    remaining
                );
                return Err(StreamError::ReadError { bytes_streamed });
            }
            Ok(read) => read,
            Err(err) => {
                log::warn!(
                    "stream: read_failed streamed={} kind={:?}",
                    bytes_streamed,
                    err.kind()
                );
                return Err(StreamError::ReadError { bytes_streamed });
            }
        };

        if let Err(err) = device.write_chunk(&buffer[..read]) {
            log::warn!(
                "stream: write_failed streamed={} err={:?}",
                bytes_streamed,
                err
            );
            return Err(StreamError::WriteError { bytes_streamed });
        }

        remaining -= read;
        bytes_streamed = bytes_streamed.saturating_add(read as u32);
        chunks += 1;
    }

    Ok(PlaybackReport {
        index,
        bytes_streamed,
        chunks,
        format: header.format,
    })
}
