//! Board wiring and peripheral timing.

pub const I2C_FREQ_KHZ: u32 = 400;
pub const I2C_TRANSACTION_TIMEOUT_MS: u64 = 40;

pub const SD_SPI_FREQ_KHZ: u32 = 400;

pub const AUDIO_SAMPLE_RATE_HZ: u32 = 16_000;
/// Bytes held by the audio device before it has to push them out over I2S.
pub const AUDIO_PENDING_BYTES: usize = 4 * 1024;
pub const AUDIO_DMA_BYTES: usize = 4 * 4092;

/// Log a telemetry line every this many steps.
pub const TELEMETRY_EVERY_STEPS: u32 = 600;
