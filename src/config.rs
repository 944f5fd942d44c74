// CHIP-8 interpreters disagree on a handful of opcodes. Every divergence we
// support is spelled out here instead of being baked into the dispatch.

/// Opcode behaviours that differ between historical interpreters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY6 / 8XYE shift VY into VX (COSMAC VIP) instead of shifting VX in place.
    pub shift_uses_vy: bool,
    /// FX1E sets VF when I + VX leaves the 12-bit address space (Amiga).
    pub index_add_sets_vf: bool,
    /// FX55 / FX65 leave I pointing past the last register touched.
    pub load_store_increments_index: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            shift_uses_vy: false,
            index_add_sets_vf: false,
            load_store_increments_index: true,
        }
    }
}

/// Who drives the 60 Hz timer decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerClock {
    /// The host calls `tick` / `elapse` on its own cadence.
    #[default]
    Host,
    /// Every step advances the timer clock by `1 / hz` seconds.
    PerStep { hz: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub quirks: Quirks,
    pub timer_clock: TimerClock,
    /// Fixed seed for CXNN; `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn with_timer_clock(mut self, timer_clock: TimerClock) -> Self {
        self.timer_clock = timer_clock;
        self
    }
}
