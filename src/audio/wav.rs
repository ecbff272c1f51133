//! RIFF/WAVE header parsing.

use core::fmt;

use embedded_io::{Read, ReadExactError, Seek, SeekFrom};

use crate::config::PcmFormat;

const RIFF_HEADER_LEN: u64 = 12;
const CHUNK_HEADER_LEN: u64 = 8;
const FMT_BODY_MIN: u32 = 16;
const MAX_CHUNKS: usize = 16;

const FORMAT_PCM: u16 = 0x0001;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Location of the PCM payload inside an asset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AssetHeader {
    pub payload_offset: u32,
    pub payload_length: u32,
    pub format: PcmFormat,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WavError {
    Io,
    Truncated,
    NotRiff,
    NotWave,
    UnsupportedEncoding(u16),
    BadFormat,
    MissingFormat,
    MissingData,
    TooManyChunks,
}

impl WavError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::Truncated => "truncated",
            Self::NotRiff => "not_riff",
            Self::NotWave => "not_wave",
            Self::UnsupportedEncoding(_) => "unsupported_encoding",
            Self::BadFormat => "bad_format",
            Self::MissingFormat => "missing_fmt",
            Self::MissingData => "missing_data",
            Self::TooManyChunks => "too_many_chunks",
        }
    }
}

impl fmt::Display for WavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedEncoding(tag) => write!(f, "unsupported encoding 0x{tag:04x}"),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl<E> From<ReadExactError<E>> for WavError {
    fn from(err: ReadExactError<E>) -> Self {
        match err {
            ReadExactError::UnexpectedEof => Self::Truncated,
            ReadExactError::Other(_) => Self::Io,
        }
    }
}

/// Walks the chunk list until `data`, which must follow a `fmt ` chunk.
pub fn parse_header<R: Read + Seek>(reader: &mut R) -> Result<AssetHeader, WavError> {
    reader.seek(SeekFrom::Start(0)).map_err(|_| WavError::Io)?;

    let mut riff = [0u8; RIFF_HEADER_LEN as usize];
    reader.read_exact(&mut riff)?;
    if &riff[0..4] != b"RIFF" {
        return Err(WavError::NotRiff);
    }
    if &riff[8..12] != b"WAVE" {
        return Err(WavError::NotWave);
    }

    let mut offset = RIFF_HEADER_LEN;
    let mut format: Option<PcmFormat> = None;
    for _ in 0..MAX_CHUNKS {
        reader
            .seek(SeekFrom::Start(offset))
            .map_err(|_| WavError::Io)?;
        let mut chunk = [0u8; CHUNK_HEADER_LEN as usize];
        reader.read_exact(&mut chunk)?;
        let size = u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        let body_offset = offset + CHUNK_HEADER_LEN;

        match &chunk[0..4] {
            b"fmt " => format = Some(read_format(reader, size)?),
            b"data" => {
                let format = format.ok_or(WavError::MissingFormat)?;
                let payload_offset = u32::try_from(body_offset).map_err(|_| WavError::BadFormat)?;
                return Ok(AssetHeader {
                    payload_offset,
                    payload_length: size,
                    format,
                });
            }
            _ => {}
        }

        // Chunk bodies are padded to an even length.
        offset = body_offset + u64::from(size) + u64::from(size & 1);
    }

    Err(if format.is_some() {
        WavError::TooManyChunks
    } else {
        WavError::MissingData
    })
}

fn read_format<R: Read>(reader: &mut R, size: u32) -> Result<PcmFormat, WavError> {
    if size < FMT_BODY_MIN {
        return Err(WavError::BadFormat);
    }
    let mut body = [0u8; FMT_BODY_MIN as usize];
    reader.read_exact(&mut body)?;

    let tag = u16::from_le_bytes([body[0], body[1]]);
    if tag != FORMAT_PCM && tag != FORMAT_EXTENSIBLE {
        return Err(WavError::UnsupportedEncoding(tag));
    }

    let format = PcmFormat {
        channels: u16::from_le_bytes([body[2], body[3]]),
        sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
        bits_per_sample: u16::from_le_bytes([body[14], body[15]]),
    };
    if format.channels == 0
        || format.sample_rate == 0
        || !matches!(format.bits_per_sample, 8 | 16 | 24 | 32)
    {
        return Err(WavError::BadFormat);
    }
    Ok(format)
}
