//! Streaming of note samples from storage to the audio output.

mod streamer;
pub mod wav;

use core::fmt;

use embedded_io::{Read, Seek};

pub use streamer::{asset_path, PlaybackReport, SampleStreamer};
pub use wav::{AssetHeader, WavError};

/// Output device that plays whatever was written since the last `start`.
pub trait AudioDevice {
    type Error: fmt::Debug;

    fn stop(&mut self);
    fn start(&mut self);
    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Open asset: a seekable byte stream that must be closed explicitly.
pub trait AssetFile: Read + Seek {
    fn close(self);
}

/// Read-only storage holding the note assets.
pub trait AssetStore {
    type Error: fmt::Debug;
    type Asset<'a>: AssetFile
    where
        Self: 'a;

    fn open(&mut self, path: &str) -> Result<Self::Asset<'_>, Self::Error>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StreamError {
    InvalidIndex { index: usize, len: usize },
    AssetNotFound,
    AssetParseError(WavError),
    ReadError { bytes_streamed: u32 },
    WriteError { bytes_streamed: u32 },
}

impl StreamError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidIndex { .. } => "invalid_index",
            Self::AssetNotFound => "asset_not_found",
            Self::AssetParseError(_) => "asset_parse_error",
            Self::ReadError { .. } => "read_error",
            Self::WriteError { .. } => "write_error",
        }
    }

    /// Bytes that reached the device before the stream was cut short.
    pub const fn bytes_streamed(&self) -> u32 {
        match self {
            Self::ReadError { bytes_streamed } | Self::WriteError { bytes_streamed } => {
                *bytes_streamed
            }
            _ => 0,
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex { index, len } => {
                write!(f, "scale index {index} outside 0..{len}")
            }
            Self::AssetNotFound => f.write_str("asset not found"),
            Self::AssetParseError(err) => write!(f, "asset header: {err}"),
            Self::ReadError { bytes_streamed } => {
                write!(f, "storage read failed after {bytes_streamed} bytes")
            }
            Self::WriteError { bytes_streamed } => {
                write!(f, "device write failed after {bytes_streamed} bytes")
            }
        }
    }
}

/// Audio bring-up failure; the loop keeps running without sound.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AudioInitError {
    StorageUnavailable,
    DeviceUnavailable,
}

impl AudioInitError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StorageUnavailable => "storage_unavailable",
            Self::DeviceUnavailable => "device_unavailable",
        }
    }
}

impl fmt::Display for AudioInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
