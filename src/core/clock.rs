use std::time::Instant;

use super::frame::FrameInfo;

/// Hands out numbered frames with wall-clock timing
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
    frame_number: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            frame_number: 0,
        }
    }

    /// Time the frame that starts now and advance the counter
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        self.frame_at(now)
    }

    fn frame_at(&mut self, now: Instant) -> FrameInfo {
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        let time = now.duration_since(self.start).as_secs_f32();
        self.last_tick = now;
        self.frame_number += 1;
        FrameInfo::new(self.frame_number, time, delta)
    }

    /// Restart delta measurement, e.g. after the loop was suspended
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
