use std::sync::Arc;

use crate::source::error::Result;
use crate::source::types::DepthFrame;

/// Receiver for freshly captured frames.
///
/// `on_new_frame` is invoked on the source's own thread at the capture rate
/// (or a recording's stored rate) and must never block: a slow listener
/// would stall the camera callback.
pub trait FrameListener: Send + Sync {
    fn on_new_frame(&self, frame: DepthFrame);
}

/// A depth frame source.
///
/// Implemented per acquisition path — a live camera SDK, a recording
/// replay, a synthetic generator for tests. Provides capture lifecycle
/// control; frames are delivered through the registered [`FrameListener`].
pub trait DepthSource: Send {
    /// Begin capturing, delivering frames to `listener` until the source is
    /// exhausted or capture is stopped.
    fn start_capture(&mut self, listener: Arc<dyn FrameListener>) -> Result<()>;

    /// Stop capturing. Blocks until the delivery thread has exited.
    fn stop_capture(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::error::SourceError;

    struct MockSource {
        capturing: bool,
    }

    impl DepthSource for MockSource {
        fn start_capture(&mut self, listener: Arc<dyn FrameListener>) -> Result<()> {
            if self.capturing {
                return Err(SourceError::AlreadyCapturing);
            }
            self.capturing = true;
            listener.on_new_frame(DepthFrame::filled(2, 2, 1.0, 50));
            Ok(())
        }

        fn stop_capture(&mut self) -> Result<()> {
            if !self.capturing {
                return Err(SourceError::NotCapturing);
            }
            self.capturing = false;
            Ok(())
        }
    }

    struct CountingListener {
        seen: std::sync::atomic::AtomicUsize,
    }

    impl FrameListener for CountingListener {
        fn on_new_frame(&self, _frame: DepthFrame) {
            self.seen.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    }

    #[test]
    fn mock_source_delivers_to_listener() {
        let listener = Arc::new(CountingListener {
            seen: std::sync::atomic::AtomicUsize::new(0),
        });
        let mut source = MockSource { capturing: false };
        source.start_capture(Arc::clone(&listener) as Arc<dyn FrameListener>).unwrap();
        assert_eq!(listener.seen.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn double_start_is_an_error() {
        let listener = Arc::new(CountingListener {
            seen: std::sync::atomic::AtomicUsize::new(0),
        });
        let mut source = MockSource { capturing: false };
        source.start_capture(Arc::clone(&listener) as Arc<dyn FrameListener>).unwrap();
        let second = source.start_capture(listener);
        assert!(matches!(second, Err(SourceError::AlreadyCapturing)));
    }

    #[test]
    fn listener_trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Arc<dyn FrameListener>>();
    }
}
