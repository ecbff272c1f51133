use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::config::JumpConfig;

use super::types::{JumpEvent, JumpPhase, JumpTrace, Landing};

#[derive(Clone, Copy, Debug)]
struct JumpSample {
    magnitude: i32,
    now_ms: u64,
}

#[derive(Default)]
struct DispatchContext {
    event: Option<JumpEvent>,
}

/// Edge-triggered jump detector with a trigger cooldown.
///
/// Enters Active when the magnitude rises strictly above the threshold while
/// Idle and outside the cooldown window, and returns to Idle when it falls
/// strictly below. A magnitude equal to the threshold never changes state.
/// Only the entry into Active produces a [`JumpEvent`].
pub struct JumpDetector {
    machine: statig::blocking::StateMachine<JumpHsm>,
}

impl JumpDetector {
    pub fn new(config: JumpConfig) -> Self {
        Self {
            machine: JumpHsm::new(config).state_machine(),
        }
    }

    pub fn observe(&mut self, magnitude: i32, now_ms: u64) -> Option<JumpEvent> {
        let mut context = DispatchContext::default();
        let sample = JumpSample {
            magnitude: magnitude.saturating_abs(),
            now_ms,
        };
        self.machine.handle_with_context(&sample, &mut context);
        context.event
    }

    pub fn trace(&self) -> JumpTrace {
        self.machine.inner().last_trace
    }

    pub fn phase(&self) -> JumpPhase {
        self.trace().phase
    }

    /// Running peak of the current jump, `None` while Idle.
    pub fn peak(&self) -> Option<i32> {
        let trace = self.trace();
        match trace.phase {
            JumpPhase::Active => Some(trace.peak),
            JumpPhase::Idle => None,
        }
    }

    pub fn last_trigger_at_ms(&self) -> Option<u64> {
        self.machine.inner().last_trigger_at_ms
    }
}

struct JumpHsm {
    config: JumpConfig,
    last_trigger_at_ms: Option<u64>,
    last_trace: JumpTrace,
}

impl JumpHsm {
    fn new(config: JumpConfig) -> Self {
        Self {
            config,
            last_trigger_at_ms: None,
            last_trace: JumpTrace::default(),
        }
    }

    fn in_cooldown(&self, now_ms: u64) -> bool {
        self.last_trigger_at_ms
            .is_some_and(|last| now_ms.saturating_sub(last) <= self.config.cooldown_ms)
    }

    fn update_trace(
        &mut self,
        sample: &JumpSample,
        phase: JumpPhase,
        peak: i32,
        triggered: bool,
        landing: Option<Landing>,
    ) {
        self.last_trace = JumpTrace {
            now_ms: sample.now_ms,
            phase,
            magnitude: sample.magnitude,
            peak,
            cooldown_active: self.in_cooldown(sample.now_ms),
            triggered,
            landing,
        };
    }
}

#[state_machine(initial = "State::idle()")]
impl JumpHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &JumpSample) -> Outcome<State> {
        if event.magnitude > self.config.threshold && !self.in_cooldown(event.now_ms) {
            self.last_trigger_at_ms = Some(event.now_ms);
            context.event = Some(JumpEvent {
                peak: event.magnitude,
                at_ms: event.now_ms,
            });
            self.update_trace(event, JumpPhase::Active, event.magnitude, true, None);
            return Transition(State::active(event.magnitude, event.now_ms));
        }

        self.update_trace(event, JumpPhase::Idle, 0, false, None);
        Handled
    }

    #[state]
    fn active(
        &mut self,
        peak: &mut i32,
        triggered_at_ms: &mut u64,
        context: &mut DispatchContext,
        event: &JumpSample,
    ) -> Outcome<State> {
        let _ = context;
        if event.magnitude < self.config.threshold {
            let landing = Landing {
                peak: *peak,
                airtime_ms: event.now_ms.saturating_sub(*triggered_at_ms),
            };
            self.update_trace(event, JumpPhase::Idle, 0, false, Some(landing));
            return Transition(State::idle());
        }

        if event.magnitude > *peak {
            *peak = event.magnitude;
        }
        self.update_trace(event, JumpPhase::Active, *peak, false, None);
        Handled
    }
}
