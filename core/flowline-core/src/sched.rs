//! Visibility-gated frame scheduling.
//!
//! The host owns the real animation-frame primitive; this module only
//! decides when a frame callback should be armed. No ticking happens while
//! the panel is hidden, even if particles or active state exist: hiding
//! the panel must cost nothing.

use crate::session::PipelineSession;

/// The host's animation-frame primitive.
///
/// `cancel` must withdraw a pending callback and must be safe to call when
/// nothing is scheduled.
pub trait FrameDriver {
    fn schedule(&mut self);
    fn cancel(&mut self);
}

/// Arms and tears down the per-frame callback as visibility changes.
pub struct TickLoop<D: FrameDriver> {
    driver: D,
    running: bool,
}

impl<D: FrameDriver> TickLoop<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts the loop on hidden→visible, tears it down on visible→hidden.
    /// Idempotent in both directions.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.running {
            return;
        }
        self.running = visible;
        if visible {
            self.driver.schedule();
        } else {
            self.driver.cancel();
        }
    }

    /// Host callback for a fired frame: runs one tick and re-arms while
    /// still visible. Returns whether the snapshot changed.
    pub fn on_frame(&mut self, session: &mut PipelineSession) -> bool {
        if !self.running {
            // A frame that raced a teardown; nothing runs.
            return false;
        }
        let changed = session.tick();
        self.driver.schedule();
        changed
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}
