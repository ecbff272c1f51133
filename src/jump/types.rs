/// Emitted once, at the Idle→Active transition.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct JumpEvent {
    /// Magnitude of the triggering sample.
    pub peak: i32,
    pub at_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(u8)]
pub enum JumpPhase {
    #[default]
    Idle = 0,
    Active = 1,
}

impl JumpPhase {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// End of a jump, as seen on the Active→Idle observation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Landing {
    /// Largest magnitude seen over the whole jump.
    pub peak: i32,
    pub airtime_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct JumpTrace {
    pub now_ms: u64,
    pub phase: JumpPhase,
    pub magnitude: i32,
    /// Running peak; 0 whenever `phase` is Idle.
    pub peak: i32,
    pub cooldown_active: bool,
    pub triggered: bool,
    pub landing: Option<Landing>,
}
