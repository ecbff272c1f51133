//! Jump-triggered note player.
//!
//! Samples the vertical acceleration of an IMU, detects jumps with a small
//! state machine, maps the jump's peak onto a musical scale and streams the
//! matching PCM asset from storage into an audio device. Hardware access goes
//! through the capability traits in [`platform`], [`motion`] and [`audio`];
//! the `firmware` package wires them to the ESP32 peripherals.

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod config;
pub mod jump;
pub mod motion;
pub mod platform;
pub mod runtime;
pub mod scale;
pub mod telemetry;

pub use audio::{PlaybackReport, SampleStreamer, StreamError};
pub use jump::{JumpDetector, JumpEvent};
pub use runtime::{Orchestrator, Playback, StepOutcome};
pub use scale::{ScaleIndex, ScaleMapper};
