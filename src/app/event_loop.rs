// Event loop - main run() method

use std::time::{Duration, Instant};

use crossterm::event;

use super::App;
use crate::action::Action;
use crate::components::Component;
use crate::error::{DialerError, Result};

const INPUT_POLL_MS: u64 = 16;

impl App {
    pub fn run(&mut self) -> Result<()> {
        loop {
            // ---- 1. Poll background sources ----

            // Outcome of the in-flight call request, if it resolved
            if self.controller.poll_outcomes() {
                self.mark_dirty();
            }

            while let Ok(health) = self.health_rx.try_recv() {
                self.health = health;
                self.mark_dirty();
            }

            // Tick (drives the pending spinner)
            if self.last_tick.elapsed() >= self.tick_interval {
                self.dispatch(Action::Tick)?;
                self.last_tick = Instant::now();
                if self.controller.state().is_pending() {
                    self.mark_dirty();
                }
            }

            if self.should_quit {
                break;
            }

            // ---- 2. Poll user input (keys/paste/resize) ----

            if event::poll(Duration::from_millis(INPUT_POLL_MS))
                .map_err(|e| DialerError::Terminal(e.to_string()))?
            {
                let event = event::read().map_err(|e| DialerError::Terminal(e.to_string()))?;

                // Any input (including resize) gets a redraw
                self.mark_dirty();

                if let Some(action) = self.call_form.handle_event(&event) {
                    self.dispatch(action)?;
                }
            }

            if self.should_quit {
                break;
            }

            // ---- 3. Draw once if anything changed ----

            if self.needs_redraw {
                self.draw()?;
                self.needs_redraw = false;
            }
        }

        if self.controller.state().is_pending() {
            tracing::info!("Exiting with a call request in flight; its outcome will be discarded");
        }
        Ok(())
    }
}
