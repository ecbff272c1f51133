use std::collections::VecDeque;

use embedded_io::{ErrorKind, ErrorType, Read, Seek, SeekFrom};

use super::*;
use crate::{
    audio::AssetFile,
    config::{AppConfig, DEFAULT_CONFIG, NOTE_ASSETS},
    motion::AccelerationSample,
};

const STEP_MS: u64 = 100;

#[derive(Default)]
struct ScriptedSampler {
    readings: VecDeque<Result<i16, ()>>,
    recover_results: VecDeque<Result<(), ()>>,
    reads: usize,
    recovers: usize,
}

impl ScriptedSampler {
    fn with_readings(values: &[i16]) -> Self {
        Self {
            readings: values.iter().map(|&v| Ok(v)).collect(),
            ..Self::default()
        }
    }
}

impl MotionSampler for ScriptedSampler {
    type Error = ();

    fn read_vertical(&mut self) -> Result<AccelerationSample, Self::Error> {
        self.reads += 1;
        self.readings
            .pop_front()
            .unwrap_or(Ok(0))
            .map(AccelerationSample)
    }

    fn recover(&mut self) -> Result<(), Self::Error> {
        self.recovers += 1;
        self.recover_results.pop_front().unwrap_or(Ok(()))
    }
}

struct OneFileAsset<'a> {
    data: &'a [u8],
    pos: usize,
}

impl ErrorType for OneFileAsset<'_> {
    type Error = ErrorKind;
}

impl Read for OneFileAsset<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.data.len().saturating_sub(self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Seek for OneFileAsset<'_> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        match pos {
            SeekFrom::Start(offset) => self.pos = offset as usize,
            _ => return Err(ErrorKind::Unsupported),
        }
        Ok(self.pos as u64)
    }
}

impl AssetFile for OneFileAsset<'_> {
    fn close(self) {}
}

/// Serves the same WAV for every path, or nothing at all.
#[derive(Default)]
struct SingleAssetStore {
    wav: Option<Vec<u8>>,
    opened: Vec<String>,
}

impl AssetStore for SingleAssetStore {
    type Error = ErrorKind;
    type Asset<'a> = OneFileAsset<'a>;

    fn open(&mut self, path: &str) -> Result<Self::Asset<'_>, Self::Error> {
        self.opened.push(path.to_string());
        let data = self.wav.as_deref().ok_or(ErrorKind::NotFound)?;
        Ok(OneFileAsset { data, pos: 0 })
    }
}

#[derive(Default)]
struct CountingDevice {
    starts: usize,
    stops: usize,
    bytes: usize,
}

impl AudioDevice for CountingDevice {
    type Error = ();

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn start(&mut self) {
        self.starts += 1;
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.bytes += bytes.len();
        Ok(())
    }
}

fn mono_wav(payload_len: usize) -> Vec<u8> {
    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&((36 + payload_len) as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&16_000u32.to_le_bytes());
    wav.extend_from_slice(&32_000u32.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(payload_len as u32).to_le_bytes());
    wav.extend(std::iter::repeat(0x5a).take(payload_len));
    wav
}

type TestOrchestrator = Orchestrator<ScriptedSampler, SingleAssetStore, CountingDevice>;

fn config() -> AppConfig {
    DEFAULT_CONFIG
}

fn with_audio(sampler: ScriptedSampler, store: SingleAssetStore) -> TestOrchestrator {
    let config = config();
    let streamer = SampleStreamer::new(
        store,
        CountingDevice::default(),
        config.stream,
        config.scale.notes,
    );
    Orchestrator::new(sampler, &config, Ok(streamer))
}

fn muted(sampler: ScriptedSampler) -> TestOrchestrator {
    Orchestrator::new(
        sampler,
        &config(),
        Err(AudioInitError::StorageUnavailable),
    )
}

fn run(orchestrator: &mut TestOrchestrator, steps: usize, start_ms: u64) -> Vec<StepOutcome> {
    (0..steps)
        .map(|i| orchestrator.step(start_ms + i as u64 * STEP_MS))
        .collect()
}

#[test]
fn jump_plays_mapped_note_once_and_reports_landing() {
    let store = SingleAssetStore {
        wav: Some(mono_wav(1_000)),
        ..SingleAssetStore::default()
    };
    let mut orchestrator = with_audio(ScriptedSampler::with_readings(&[50, 50, 120, 150, 60]), store);

    let outcomes = run(&mut orchestrator, 5, 0);

    assert_eq!(outcomes[0], StepOutcome::Quiet);
    assert_eq!(outcomes[1], StepOutcome::Quiet);
    let StepOutcome::Jumped {
        event,
        index,
        playback: Playback::Played(report),
    } = outcomes[2]
    else {
        panic!("expected a played jump, got {:?}", outcomes[2]);
    };
    assert_eq!(event, JumpEvent { peak: 120, at_ms: 200 });
    // (120 - 80) * 7 / 320 = 0.875
    assert_eq!(index, ScaleIndex(1));
    assert_eq!(report.bytes_streamed, 1_000);
    assert_eq!(outcomes[3], StepOutcome::Quiet);
    assert_eq!(outcomes[4], StepOutcome::Landed { peak: 150 });

    let streamer = orchestrator.streamer().unwrap();
    assert_eq!(streamer.store().opened, [format!("/assets/notes/{}", NOTE_ASSETS[1])]);
    assert_eq!(streamer.device().stops, 1);
    assert_eq!(streamer.device().starts, 1);
    assert_eq!(streamer.device().bytes, 1_000);

    let telemetry = orchestrator.telemetry();
    assert_eq!(telemetry.jumps, 1);
    assert_eq!(telemetry.landings, 1);
    assert_eq!(telemetry.plays_ok, 1);
    assert_eq!(telemetry.bytes_streamed, 1_000);
}

#[test]
fn peak_accumulator_resets_after_a_reported_jump() {
    let mut orchestrator = muted(ScriptedSampler::with_readings(&[70, 120, 150]));

    orchestrator.step(0);
    assert_eq!(orchestrator.peak_accumulator(), 70);
    assert!(matches!(orchestrator.step(100), StepOutcome::Jumped { .. }));
    assert_eq!(orchestrator.peak_accumulator(), 0);
    orchestrator.step(200);
    assert_eq!(orchestrator.peak_accumulator(), 150);
}

#[test]
fn muted_orchestrator_still_detects_and_maps() {
    let mut orchestrator = muted(ScriptedSampler::with_readings(&[400, 0]));
    assert!(orchestrator.is_muted());

    assert_eq!(
        orchestrator.step(0),
        StepOutcome::Jumped {
            event: JumpEvent { peak: 400, at_ms: 0 },
            index: ScaleIndex(7),
            playback: Playback::Muted,
        }
    );
    assert_eq!(orchestrator.step(100), StepOutcome::Landed { peak: 400 });
    assert_eq!(orchestrator.telemetry().plays_muted, 1);
}

#[test]
fn failed_playback_does_not_stop_the_loop() {
    let readings = [200, 0, 0, 0, 0, 0, 0, 300];
    let mut orchestrator = with_audio(
        ScriptedSampler::with_readings(&readings),
        SingleAssetStore::default(),
    );

    let outcomes = run(&mut orchestrator, readings.len(), 0);
    let failures: Vec<_> = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                StepOutcome::Jumped {
                    playback: Playback::Failed(StreamError::AssetNotFound),
                    ..
                }
            )
        })
        .collect();
    assert_eq!(failures.len(), 2);

    let device = orchestrator.streamer().unwrap().device();
    assert_eq!(device.stops, 2);
    assert_eq!(device.starts, 2);
    assert_eq!(orchestrator.telemetry().plays_failed, 2);
}

#[test]
fn sensor_fault_backs_off_before_recovering() {
    let mut sampler = ScriptedSampler::with_readings(&[]);
    sampler.readings.push_back(Err(()));
    sampler.readings.push_back(Ok(10));
    let mut orchestrator = muted(sampler);

    assert_eq!(orchestrator.step(0), StepOutcome::SensorFault);
    assert_eq!(orchestrator.step(500), StepOutcome::SensorFault);
    assert_eq!(orchestrator.step(999), StepOutcome::SensorFault);
    assert_eq!(orchestrator.sampler().reads, 1);
    assert_eq!(orchestrator.sampler().recovers, 0);

    assert_eq!(orchestrator.step(1_000), StepOutcome::Quiet);
    assert_eq!(orchestrator.sampler().recovers, 1);
    assert_eq!(orchestrator.sampler().reads, 2);

    let telemetry = orchestrator.telemetry();
    assert_eq!(telemetry.sensor_faults, 1);
    assert_eq!(telemetry.sensor_recoveries, 1);
}

#[test]
fn failed_recovery_restarts_the_backoff_window() {
    let mut sampler = ScriptedSampler::with_readings(&[]);
    sampler.readings.push_back(Err(()));
    sampler.recover_results.push_back(Err(()));
    let mut orchestrator = muted(sampler);

    assert_eq!(orchestrator.step(0), StepOutcome::SensorFault);
    assert_eq!(orchestrator.step(1_000), StepOutcome::SensorFault);
    assert_eq!(orchestrator.step(1_500), StepOutcome::SensorFault);
    assert_eq!(orchestrator.sampler().recovers, 1);

    assert_eq!(orchestrator.step(2_000), StepOutcome::Quiet);
    assert_eq!(orchestrator.sampler().recovers, 2);
    assert_eq!(orchestrator.telemetry().sensor_faults, 2);
}
