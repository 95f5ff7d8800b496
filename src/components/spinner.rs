use std::time::{Duration, Instant};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Activity indicator for the submit button while a call request is in flight
#[derive(Debug, Clone)]
pub struct Spinner {
    frame_index: usize,
    last_frame_time: Instant,
    active: bool,
}

impl Default for Spinner {
    fn default() -> Self {
        Self {
            frame_index: 0,
            last_frame_time: Instant::now(),
            active: false,
        }
    }
}

impl Spinner {
    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.frame_index = 0;
            self.last_frame_time = Instant::now();
        }
        self.active = active;
    }

    /// Advance one frame if enough time has passed. Returns true if the frame changed.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }

        if self.last_frame_time.elapsed() >= FRAME_DURATION {
            self.frame_index = (self.frame_index + 1) % FRAMES.len();
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }

    pub fn current_frame(&self) -> &'static str {
        FRAMES[self.frame_index % FRAMES.len()]
    }
}
