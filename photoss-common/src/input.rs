//! User activity that ends the screensaver.

use tokio_util::sync::CancellationToken;

/// Pointer travel, in pixels along either axis, that counts as activity.
pub const MOUSE_MOVE_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyPress,
    MouseClick,
    MouseMove { x: f64, y: f64 },
}

/// Watches input events and cancels `shutdown` on user activity.
///
/// The token is shared by every session and presenter, so activity on any
/// display stops all of them.
#[derive(Debug)]
pub struct InputMonitor {
    shutdown: CancellationToken,
    origin: Option<(f64, f64)>,
}

impl InputMonitor {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            origin: None,
        }
    }

    /// Returns true once shutdown has been requested.
    pub fn observe(&mut self, event: InputEvent) -> bool {
        let activity = match event {
            InputEvent::KeyPress | InputEvent::MouseClick => true,
            InputEvent::MouseMove { x, y } => match self.origin {
                None => {
                    // First report is where the pointer already was
                    self.origin = Some((x, y));
                    false
                }
                Some((ox, oy)) => {
                    (x - ox).abs() > MOUSE_MOVE_THRESHOLD || (y - oy).abs() > MOUSE_MOVE_THRESHOLD
                }
            },
        };

        if activity && !self.shutdown.is_cancelled() {
            log::info!("User activity ({:?}), stopping slideshow", event);
            self.shutdown.cancel();
        }
        self.shutdown.is_cancelled()
    }
}
