use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::info;

use crate::consumer::worker::FrameHandler;
use crate::pipeline::types::GreyscaleFrame;

/// Something that can show a preview frame.
///
/// `show` returns `false` when the surface wants out — a window receiving
/// a dismiss key, for instance — which terminates the owning consumer.
pub trait DisplaySurface: Send + 'static {
    fn show(&mut self, frame: &GreyscaleFrame) -> bool;
}

/// Feeds incoming preview frames to a display surface.
pub struct PreviewDriver<S: DisplaySurface> {
    surface: S,
}

impl<S: DisplaySurface> PreviewDriver<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }
}

impl<S: DisplaySurface> FrameHandler<GreyscaleFrame> for PreviewDriver<S> {
    fn on_frame(&mut self, frame: Arc<GreyscaleFrame>) -> ControlFlow<()> {
        if self.surface.show(&frame) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }
}

/// Headless display surface that logs a summary line per interval of
/// frames. Useful on a glove worn away from any screen.
pub struct ConsolePreview {
    frames_shown: u64,
    log_every: u64,
}

impl ConsolePreview {
    pub fn new(log_every: u64) -> Self {
        Self {
            frames_shown: 0,
            log_every: log_every.max(1),
        }
    }
}

impl DisplaySurface for ConsolePreview {
    fn show(&mut self, frame: &GreyscaleFrame) -> bool {
        self.frames_shown += 1;
        if self.frames_shown % self.log_every == 0 {
            info!(
                "preview frame {}: {}x{}, mean intensity {:.1}",
                self.frames_shown,
                frame.width,
                frame.height,
                frame.mean_intensity()
            );
        }
        true
    }
}
