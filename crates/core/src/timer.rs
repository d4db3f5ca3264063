//! Level countdown.

use crate::types::TIMER_WARNING_SECS;

/// What a countdown tick crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Running,
    /// Crossed the warning threshold (reported once per run).
    Warning,
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct CountdownTimer {
    remaining_ms: u64,
    running: bool,
    warned: bool,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, seconds: u32) {
        self.remaining_ms = u64::from(seconds) * 1000;
        self.running = true;
        self.warned = false;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Whole seconds left, rounded up the way a countdown display shows them.
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_ms.div_ceil(1000) as u32
    }

    pub fn is_warning(&self) -> bool {
        self.warned
    }

    pub fn tick(&mut self, elapsed_ms: u32) -> TimerTick {
        if !self.running {
            return TimerTick::Running;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(u64::from(elapsed_ms));
        if self.remaining_ms == 0 {
            self.running = false;
            return TimerTick::Expired;
        }
        if !self.warned && self.remaining_secs() <= TIMER_WARNING_SECS {
            self.warned = true;
            return TimerTick::Warning;
        }
        TimerTick::Running
    }
}
