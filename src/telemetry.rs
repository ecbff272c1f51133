//! Loop counters owned by the orchestrator.

use crate::audio::{PlaybackReport, StreamError};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TelemetrySnapshot {
    pub jumps: u32,
    pub landings: u32,
    pub plays_ok: u32,
    pub plays_failed: u32,
    pub plays_truncated: u32,
    pub plays_muted: u32,
    pub bytes_streamed: u64,
    pub sensor_faults: u32,
    pub sensor_recoveries: u32,
}

#[derive(Debug, Default)]
pub struct Telemetry {
    counters: TelemetrySnapshot,
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            counters: TelemetrySnapshot {
                jumps: 0,
                landings: 0,
                plays_ok: 0,
                plays_failed: 0,
                plays_truncated: 0,
                plays_muted: 0,
                bytes_streamed: 0,
                sensor_faults: 0,
                sensor_recoveries: 0,
            },
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.counters
    }

    pub fn record_jump(&mut self) {
        self.counters.jumps = self.counters.jumps.saturating_add(1);
    }

    pub fn record_landing(&mut self) {
        self.counters.landings = self.counters.landings.saturating_add(1);
    }

    pub fn record_playback(&mut self, result: &Result<PlaybackReport, StreamError>) {
        let c = &mut self.counters;
        match result {
            Ok(report) => {
                c.plays_ok = c.plays_ok.saturating_add(1);
                c.bytes_streamed = c
                    .bytes_streamed
                    .saturating_add(u64::from(report.bytes_streamed));
            }
            Err(err) => {
                c.plays_failed = c.plays_failed.saturating_add(1);
                if matches!(
                    err,
                    StreamError::ReadError { .. } | StreamError::WriteError { .. }
                ) {
                    c.plays_truncated = c.plays_truncated.saturating_add(1);
                }
                c.bytes_streamed = c
                    .bytes_streamed
                    .saturating_add(u64::from(err.bytes_streamed()));
            }
        }
    }

    pub fn record_muted(&mut self) {
        self.counters.plays_muted = self.counters.plays_muted.saturating_add(1);
    }

    pub fn record_sensor_fault(&mut self) {
        self.counters.sensor_faults = self.counters.sensor_faults.saturating_add(1);
    }

    pub fn record_sensor_recovery(&mut self) {
        self.counters.sensor_recoveries = self.counters.sensor_recoveries.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PcmFormat;
    use crate::scale::ScaleIndex;

    #[test]
    fn truncated_streams_count_as_failed_with_partial_bytes() {
        let mut telemetry = Telemetry::new();
        telemetry.record_playback(&Ok(PlaybackReport {
            index: ScaleIndex(0),
            bytes_streamed: 1_000,
            chunks: 2,
            format: PcmFormat {
                channels: 1,
                sample_rate: 16_000,
                bits_per_sample: 16,
            },
        }));
        telemetry.record_playback(&Err(StreamError::WriteError {
            bytes_streamed: 512,
        }));
        telemetry.record_playback(&Err(StreamError::AssetNotFound));

        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.plays_ok, 1);
        assert_eq!(snapshot.plays_failed, 2);
        assert_eq!(snapshot.plays_truncated, 1);
        assert_eq!(snapshot.bytes_streamed, 1_512);
    }
}
