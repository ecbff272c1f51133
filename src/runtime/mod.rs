//! One sample-detect-play iteration of the main loop.

#[cfg(test)]
mod tests;

use crate::{
    audio::{AssetStore, AudioDevice, AudioInitError, PlaybackReport, SampleStreamer, StreamError},
    config::{AppConfig, LoopConfig},
    jump::{JumpDetector, JumpEvent},
    motion::MotionSampler,
    scale::{ScaleIndex, ScaleMapper},
    telemetry::{Telemetry, TelemetrySnapshot},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Playback {
    Played(PlaybackReport),
    Failed(StreamError),
    /// Audio never came up; the jump was only logged.
    Muted,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    Quiet,
    /// The sensor failed this step or is still waiting for its retry slot.
    SensorFault,
    Landed {
        peak: i32,
    },
    Jumped {
        event: JumpEvent,
        index: ScaleIndex,
        playback: Playback,
    },
}

/// Owns the sensor, detector and streamer; the caller supplies time and pacing.
pub struct Orchestrator<M, S, D> {
    sampler: M,
    detector: JumpDetector,
    mapper: ScaleMapper,
    streamer: Option<SampleStreamer<S, D>>,
    loop_config: LoopConfig,
    peak_accumulator: i32,
    sensor_fault_at_ms: Option<u64>,
    telemetry: Telemetry,
}

impl<M, S, D> Orchestrator<M, S, D>
where
    M: MotionSampler,
    S: AssetStore,
    D: AudioDevice,
{
    pub fn new(
        sampler: M,
        config: &AppConfig,
        audio: Result<SampleStreamer<S, D>, AudioInitError>,
    ) -> Self {
        let streamer = match audio {
            Ok(streamer) => Some(streamer),
            Err(err) => {
                log::warn!("audio: unavailable err={} mode=muted", err.as_str());
                None
            }
        };

        Self {
            sampler,
            detector: JumpDetector::new(config.jump),
            mapper: ScaleMapper::new(&config.scale),
            streamer,
            loop_config: config.run_loop,
            peak_accumulator: 0,
            sensor_fault_at_ms: None,
            telemetry: Telemetry::new(),
        }
    }

    pub fn step(&mut self, now_ms: u64) -> StepOutcome {
        if !self.sensor_ready(now_ms) {
            return StepOutcome::SensorFault;
        }

        let sample = match self.sampler.read_vertical() {
            Ok(sample) => sample,
            Err(err) => {
                log::warn!("imu: read_failed now_ms={} err={:?}", now_ms, err);
                self.telemetry.record_sensor_fault();
                self.sensor_fault_at_ms = Some(now_ms);
                return StepOutcome::SensorFault;
            }
        };

        let magnitude = sample.magnitude();
        self.peak_accumulator = self.peak_accumulator.max(magnitude);

        if let Some(event) = self.detector.observe(magnitude, now_ms) {
            return self.handle_jump(event);
        }

        if let Some(landing) = self.detector.trace().landing {
            self.telemetry.record_landing();
            log::debug!(
                "jump: landed peak={} airtime_ms={}",
                landing.peak,
                landing.airtime_ms
            );
            return StepOutcome::Landed { peak: landing.peak };
        }

        StepOutcome::Quiet
    }

    /// Largest magnitude seen since the last jump was reported.
    pub fn peak_accumulator(&self) -> i32 {
        self.peak_accumulator
    }

    pub fn detector(&self) -> &JumpDetector {
        &self.detector
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    pub fn is_muted(&self) -> bool {
        self.streamer.is_none()
    }

    pub fn sample_period_ms(&self) -> u64 {
        self.loop_config.sample_period_ms
    }

    pub fn streamer(&self) -> Option<&SampleStreamer<S, D>> {
        self.streamer.as_ref()
    }

    pub fn sampler(&self) -> &M {
        &self.sampler
    }

    fn handle_jump(&mut self, event: JumpEvent) -> StepOutcome {
        self.telemetry.record_jump();
        let index = self.mapper.map_to_scale(event.peak);

        let playback = match self.streamer.as_mut() {
            Some(streamer) => {
                let result = streamer.play(index);
                self.telemetry.record_playback(&result);
                match result {
                    Ok(report) => Playback::Played(report),
                    Err(err) => Playback::Failed(err),
                }
            }
            None => {
                self.telemetry.record_muted();
                Playback::Muted
            }
        };

        log::info!(
            "jump: peak={} index={} at_ms={} playback={}",
            event.peak,
            index.get(),
            event.at_ms,
            playback_label(&playback)
        );
        self.peak_accumulator = 0;

        StepOutcome::Jumped {
            event,
            index,
            playback,
        }
    }

    /// Gates sampling while a sensor fault is backing off.
    fn sensor_ready(&mut self, now_ms: u64) -> bool {
        let Some(fault_at_ms) = self.sensor_fault_at_ms else {
            return true;
        };
        if now_ms.saturating_sub(fault_at_ms) < self.loop_config.sensor_retry_ms {
            return false;
        }

        match self.sampler.recover() {
            Ok(()) => {
                log::info!("imu: recovered now_ms={}", now_ms);
                self.telemetry.record_sensor_recovery();
                self.sensor_fault_at_ms = None;
                true
            }
            Err(err) => {
                log::warn!("imu: recover_failed now_ms={} err={:?}", now_ms, err);
                self.telemetry.record_sensor_fault();
                self.sensor_fault_at_ms = Some(now_ms);
                false
            }
        }
    }
}

fn playback_label(playback: &Playback) -> &'static str {
    match playback {
        Playback::Played(_) => "played",
        Playback::Failed(err) => err.as_str(),
        Playback::Muted => "muted",
    }
}
