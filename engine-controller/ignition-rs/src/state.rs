use shared::ignition_hal::IgnitionPhase;

/// Everything `recompute` reads or writes, replaced as one value.
///
/// The controller never mutates a field in place: each operation builds
/// the next state and stores it with a single assignment, so a reader
/// sharing the controller behind a lock or a masked interrupt sees either
/// the old phase and advance or the new pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub phase: IgnitionPhase,
    pub current_advance: i32,
    // Last value requested through an override, restored after a sensor dropout
    pub fixed_advance: i32,
    // Phase an active override replaced, restored when it is cleared
    pub resume_phase: IgnitionPhase,
}

impl ControllerState {
    pub const fn new(safe_advance: i32) -> Self {
        Self {
            phase: IgnitionPhase::Uninitialized,
            current_advance: safe_advance,
            fixed_advance: safe_advance,
            resume_phase: IgnitionPhase::Uninitialized,
        }
    }

    /// State right after a setup attempt settled on `phase`.
    pub const fn settled(phase: IgnitionPhase, safe_advance: i32) -> Self {
        Self {
            phase,
            current_advance: safe_advance,
            fixed_advance: safe_advance,
            resume_phase: phase,
        }
    }

    pub fn with_advance(self, current_advance: i32) -> Self {
        Self {
            current_advance,
            ..self
        }
    }

    pub fn with_phase(self, phase: IgnitionPhase) -> Self {
        Self { phase, ..self }
    }

    /// False until `setup` has run, including while an override set before it is active.
    pub fn setup_attempted(&self) -> bool {
        let underlying = if self.phase == IgnitionPhase::FixedOverride {
            self.resume_phase
        } else {
            self.phase
        };

        underlying != IgnitionPhase::Uninitialized
    }
}
