//! Self-contained timers - accumulate delta time and decide when to fire

/// Countdown timer - fires once after duration
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl Countdown {
    /// Create inactive countdown
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            active: false,
        }
    }

    /// Start (or restart) the countdown
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Tick with delta, returns true if completed
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.active {
            return false;
        }

        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }

        if self.elapsed >= self.duration {
            self.active = false;
            true
        } else {
            false
        }
    }
}

/// Frames per second averaged over a fixed window
#[derive(Debug, Clone, Copy)]
pub struct FpsMeter {
    window: f32,
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsMeter {
    pub fn new(window: f32) -> Self {
        Self {
            window,
            frames: 0,
            elapsed: 0.0,
            fps: 0.0,
        }
    }

    /// Count a frame; returns the new reading when a window closes
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta.max(0.0);

        if self.elapsed >= self.window {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Value easing linearly towards a target, covering a unit change in `duration`
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    value: f32,
    duration: f32,
}

impl Fade {
    pub fn new(value: f32, duration: f32) -> Self {
        Self {
            value,
            duration: duration.max(0.0),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Step towards `target`, returns the new value
    pub fn tick(&mut self, target: f32, delta: f32) -> f32 {
        if self.duration <= 0.0 {
            self.value = target;
        } else if delta.is_finite() && delta > 0.0 {
            let step = delta / self.duration;
            self.value += (target - self.value).clamp(-step, step);
        }
        self.value
    }
}
