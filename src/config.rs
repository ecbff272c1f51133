use crate::motion::{AccelFullScale, AccelOutputRate, Axis};

/// Bytes moved from storage to the audio device per read/write round.
pub const STREAM_CHUNK_BYTES: usize = 512;
/// Longest asset path accepted by the streamer, separators included.
pub const ASSET_PATH_MAX: usize = 64;

pub const NOTE_ASSETS: [&str; 8] = [
    "C4.WAV", "D4.WAV", "E4.WAV", "F4.WAV", "G4.WAV", "A4.WAV", "B4.WAV", "C5.WAV",
];

#[derive(Clone, Copy, Debug)]
pub struct MotionConfig {
    pub vertical_axis: Axis,
    pub full_scale: AccelFullScale,
    pub output_rate: AccelOutputRate,
}

#[derive(Clone, Copy, Debug)]
pub struct JumpConfig {
    pub threshold: i32,
    pub cooldown_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct ScaleConfig {
    pub min_accel: i32,
    pub max_accel: i32,
    pub notes: &'static [&'static str],
}

impl ScaleConfig {
    pub const fn len(&self) -> usize {
        self.notes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct StreamConfig {
    pub asset_root: &'static str,
    /// Format the output device was configured for; mismatching assets are
    /// logged but still played.
    pub expected_format: Option<PcmFormat>,
}

#[derive(Clone, Copy, Debug)]
pub struct LoopConfig {
    pub sample_period_ms: u64,
    pub sensor_retry_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct AppConfig {
    pub motion: MotionConfig,
    pub jump: JumpConfig,
    pub scale: ScaleConfig,
    pub stream: StreamConfig,
    pub run_loop: LoopConfig,
}

pub const DEFAULT_CONFIG: AppConfig = AppConfig {
    motion: MotionConfig {
        vertical_axis: Axis::Z,
        full_scale: AccelFullScale::G16,
        output_rate: AccelOutputRate::Hz104,
    },
    jump: JumpConfig {
        threshold: 80,
        cooldown_ms: 500,
    },
    scale: ScaleConfig {
        min_accel: 80,
        max_accel: 400,
        notes: &NOTE_ASSETS,
    },
    stream: StreamConfig {
        asset_root: "/assets/notes",
        expected_format: Some(PcmFormat {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
        }),
    },
    run_loop: LoopConfig {
        sample_period_ms: 100,
        sensor_retry_ms: 1_000,
    },
};

const _: () = assert!(DEFAULT_CONFIG.scale.min_accel < DEFAULT_CONFIG.scale.max_accel);
const _: () = assert!(!DEFAULT_CONFIG.scale.is_empty());
const _: () = assert!(STREAM_CHUNK_BYTES > 0);

pub fn active_config() -> &'static AppConfig {
    &DEFAULT_CONFIG
}
