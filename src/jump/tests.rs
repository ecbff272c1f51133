use super::*;
use crate::config::JumpConfig;

const CONFIG: JumpConfig = JumpConfig {
    threshold: 80,
    cooldown_ms: 500,
};

fn feed(
    detector: &mut JumpDetector,
    samples: &[i32],
    start_ms: u64,
    step_ms: u64,
) -> Vec<(usize, JumpEvent)> {
    samples
        .iter()
        .enumerate()
        .filter_map(|(i, &magnitude)| {
            detector
                .observe(magnitude, start_ms + i as u64 * step_ms)
                .map(|event| (i, event))
        })
        .collect()
}

#[test]
fn single_jump_triggers_on_first_sample_above_threshold() {
    let mut detector = JumpDetector::new(CONFIG);

    let events = feed(&mut detector, &[50, 50, 120, 150], 1_000, 100);
    assert_eq!(
        events,
        [(
            2,
            JumpEvent {
                peak: 120,
                at_ms: 1_200
            }
        )]
    );
    assert_eq!(detector.peak(), Some(150));

    assert_eq!(detector.observe(60, 1_400), None);
    let trace = detector.trace();
    assert_eq!(trace.phase, JumpPhase::Idle);
    assert_eq!(trace.peak, 0);
    assert_eq!(
        trace.landing,
        Some(Landing {
            peak: 150,
            airtime_ms: 200
        })
    );
    assert_eq!(detector.peak(), None);
}

#[test]
fn first_trigger_is_not_gated_by_cooldown() {
    let mut detector = JumpDetector::new(CONFIG);
    assert!(detector.observe(200, 0).is_some());
}

#[test]
fn samples_below_threshold_keep_idle() {
    let mut detector = JumpDetector::new(CONFIG);
    for (i, magnitude) in (0..80).chain((0..80).rev()).enumerate() {
        assert_eq!(detector.observe(magnitude, i as u64 * 10), None);
        assert_eq!(detector.phase(), JumpPhase::Idle);
    }
    assert_eq!(detector.last_trigger_at_ms(), None);
}

#[test]
fn threshold_value_is_sticky_in_both_states() {
    let mut detector = JumpDetector::new(CONFIG);
    assert_eq!(detector.observe(80, 1_000), None);
    assert_eq!(detector.phase(), JumpPhase::Idle);

    assert!(detector.observe(81, 1_100).is_some());
    assert_eq!(detector.observe(80, 1_200), None);
    assert_eq!(detector.phase(), JumpPhase::Active);
    assert_eq!(detector.peak(), Some(81));

    assert_eq!(detector.observe(79, 1_300), None);
    assert_eq!(detector.phase(), JumpPhase::Idle);
}

#[test]
fn negative_input_is_treated_as_magnitude() {
    let mut detector = JumpDetector::new(CONFIG);
    let event = detector.observe(-300, 1_000).unwrap();
    assert_eq!(event.peak, 300);
}

#[test]
fn retrigger_inside_cooldown_is_suppressed() {
    let mut detector = JumpDetector::new(CONFIG);

    assert!(detector.observe(200, 1_000).is_some());
    assert_eq!(detector.observe(10, 1_100), None);
    assert_eq!(detector.observe(200, 1_200), None);
    assert!(detector.trace().cooldown_active);
    assert_eq!(detector.phase(), JumpPhase::Idle);

    // Exactly COOLDOWN after the trigger is still inside the window.
    assert_eq!(detector.observe(200, 1_500), None);
    let event = detector.observe(200, 1_501).unwrap();
    assert_eq!(event.at_ms, 1_501);
    assert!(detector.trace().triggered);
}

#[test]
fn long_jump_emits_once_until_landing() {
    let mut detector = JumpDetector::new(CONFIG);
    let samples = [100, 300, 250, 400, 90, 85, 81, 200];

    let events = feed(&mut detector, &samples, 0, 100);
    assert_eq!(events.len(), 1);
    assert_eq!(detector.peak(), Some(400));
}

#[test]
fn events_are_never_closer_than_cooldown() {
    let mut detector = JumpDetector::new(CONFIG);
    let mut seed = 0x1234_5678u32;
    let mut last_event_at: Option<u64> = None;

    for step in 0..5_000u64 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let magnitude = (seed % 300) as i32;
        let now_ms = step * 37;

        if let Some(event) = detector.observe(magnitude, now_ms) {
            if let Some(previous) = last_event_at {
                assert!(event.at_ms - previous > CONFIG.cooldown_ms);
            }
            last_event_at = Some(event.at_ms);
        }
    }
    assert!(last_event_at.is_some());
}

#[test]
fn peak_is_non_decreasing_while_active_and_cleared_on_landing() {
    let mut detector = JumpDetector::new(CONFIG);
    let samples = [90, 150, 120, 160, 140, 200, 81, 79];
    let mut previous_peak = 0;

    for (i, &magnitude) in samples.iter().enumerate() {
        let _ = detector.observe(magnitude, i as u64 * 50);
        match detector.peak() {
            Some(peak) => {
                assert!(peak >= previous_peak);
                previous_peak = peak;
            }
            None => {
                assert_eq!(i, samples.len() - 1);
                assert_eq!(detector.trace().peak, 0);
                assert_eq!(detector.trace().landing.map(|l| l.peak), Some(200));
            }
        }
    }
}
