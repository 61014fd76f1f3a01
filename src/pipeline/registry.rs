use std::sync::Arc;

use parking_lot::Mutex;

use crate::pipeline::types::{GreyscaleFrame, TileGrid};

/// A sink that accepts one derived frame without blocking the caller.
///
/// Implementations hand the frame off to their own thread; the transform
/// loop must never wait on a slow consumer.
pub trait FrameSink<T>: Send + Sync {
    fn put_frame(&self, frame: Arc<T>);
}

/// Holds every registered preview and tile sink.
///
/// The registry only ever grows — there is no unregister path — and
/// delivery happens in registration order. Artifacts are `Arc`-shared, so
/// every sink sees the same immutable allocation.
pub struct ListenerRegistry {
    greyscale: Mutex<Vec<Arc<dyn FrameSink<GreyscaleFrame>>>>,
    tiles: Mutex<Vec<Arc<dyn FrameSink<TileGrid>>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            greyscale: Mutex::new(Vec::new()),
            tiles: Mutex::new(Vec::new()),
        }
    }

    pub fn add_greyscale_listener(&self, sink: Arc<dyn FrameSink<GreyscaleFrame>>) {
        self.greyscale.lock().push(sink);
    }

    pub fn add_tile_listener(&self, sink: Arc<dyn FrameSink<TileGrid>>) {
        self.tiles.lock().push(sink);
    }

    pub fn greyscale_listener_count(&self) -> usize {
        self.greyscale.lock().len()
    }

    pub fn tile_listener_count(&self) -> usize {
        self.tiles.lock().len()
    }

    /// Deliver both artifacts of one transform pass to every sink, in
    /// registration order within each artifact type.
    pub fn publish(&self, grey: Arc<GreyscaleFrame>, grid: Arc<TileGrid>) {
        for sink in self.greyscale.lock().iter() {
            sink.put_frame(Arc::clone(&grey));
        }
        for sink in self.tiles.lock().iter() {
            sink.put_frame(Arc::clone(&grid));
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    struct Recorder<T> {
        label: &'static str,
        log: Arc<PlMutex<Vec<(&'static str, Arc<T>)>>>,
    }

    impl<T: Send + Sync> FrameSink<T> for Recorder<T> {
        fn put_frame(&self, frame: Arc<T>) {
            self.log.lock().push((self.label, frame));
        }
    }

    fn grey() -> Arc<GreyscaleFrame> {
        Arc::new(GreyscaleFrame {
            width: 2,
            height: 2,
            pixels: vec![1, 2, 3, 4],
            timestamp_us: 0,
        })
    }

    fn grid() -> Arc<TileGrid> {
        Arc::new(TileGrid::new(1, vec![9], 0))
    }

    #[test]
    fn starts_empty() {
        let registry = ListenerRegistry::new();
        assert_eq!(registry.greyscale_listener_count(), 0);
        assert_eq!(registry.tile_listener_count(), 0);
    }

    #[test]
    fn publish_reaches_listeners_in_registration_order() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(PlMutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            registry.add_greyscale_listener(Arc::new(Recorder {
                label,
                log: Arc::clone(&log),
            }));
        }

        registry.publish(grey(), grid());

        let seen: Vec<&str> = log.lock().iter().map(|(l, _)| *l).collect();
        assert_eq!(seen, vec!["first", "second", "third"]);
    }

    #[test]
    fn every_listener_sees_the_same_allocation() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(PlMutex::new(Vec::new()));
        for label in ["a", "b"] {
            registry.add_greyscale_listener(Arc::new(Recorder {
                label,
                log: Arc::clone(&log),
            }));
        }

        registry.publish(grey(), grid());

        let seen = log.lock();
        assert!(Arc::ptr_eq(&seen[0].1, &seen[1].1), "no copy at fan-out");
    }

    #[test]
    fn tile_listeners_are_independent_of_greyscale_listeners() {
        let registry = ListenerRegistry::new();
        let grey_log = Arc::new(PlMutex::new(Vec::new()));
        let tile_log = Arc::new(PlMutex::new(Vec::new()));
        registry.add_greyscale_listener(Arc::new(Recorder {
            label: "grey",
            log: Arc::clone(&grey_log),
        }));
        registry.add_tile_listener(Arc::new(Recorder {
            label: "tiles",
            log: Arc::clone(&tile_log),
        }));

        registry.publish(grey(), grid());
        registry.publish(grey(), grid());

        assert_eq!(grey_log.lock().len(), 2);
        assert_eq!(tile_log.lock().len(), 2);
    }

    #[test]
    fn publish_with_no_listeners_is_fine() {
        let registry = ListenerRegistry::new();
        registry.publish(grey(), grid());
    }
}
