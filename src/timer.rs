use std::time::Duration;

pub const TIMER_DEC_PER_SECOND: u64 = 60;
pub const TICK_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / TIMER_DEC_PER_SECOND);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    pub count: u8,
}

impl Timer {
    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    pub fn tick(&mut self) {
        self.count = self.count.saturating_sub(1);
    }
}

/// Delay and sound timers, both decaying at 60 Hz regardless of how many
/// instructions run in between.
#[derive(Debug, Clone, Default)]
pub struct Timers {
    pub delay: Timer,
    pub sound: Timer,
    // time carried over between `elapse` calls
    residual: Duration,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self) {
        self.delay.tick();
        self.sound.tick();
    }

    /// Wall-clock driven decay. Returns how many 60 Hz ticks were applied.
    pub fn elapse(&mut self, elapsed: Duration) -> u32 {
        self.residual += elapsed;
        let mut ticks = 0;
        while self.residual >= TICK_PERIOD {
            self.residual -= TICK_PERIOD;
            self.tick();
            ticks += 1;
        }
        ticks
    }

    pub fn sound_active(&self) -> bool {
        self.sound.count > 0
    }
}
