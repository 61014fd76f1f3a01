use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use depth_glove::consumer::display::{ConsolePreview, PreviewDriver};
use depth_glove::consumer::glove::{ConsoleBoard, GloveDriver};
use depth_glove::consumer::worker::ConsumerThread;
use depth_glove::pipeline::cancel::ShutdownToken;
use depth_glove::pipeline::runner::Pipeline;
use depth_glove::pipeline::transform::DepthTransform;
use depth_glove::settings::store;
use depth_glove::settings::types::PipelineSettings;
use depth_glove::source::backend::{DepthSource, FrameListener};
use depth_glove::source::replay::ReplaySource;
use depth_glove::source::types::{DepthFrame, DepthPoint};

/// Sensor resolution of the time-of-flight camera the glove was built
/// around.
const SENSOR_WIDTH: usize = 224;
const SENSOR_HEIGHT: usize = 171;

/// A synthetic scene: empty room with one close object sweeping left to
/// right across the field of view.
fn sweep_scene(frame_count: usize) -> Vec<DepthFrame> {
    (0..frame_count)
        .map(|step| {
            let mut frame = DepthFrame::filled(SENSOR_WIDTH, SENSOR_HEIGHT, 3.0, 60);
            let object_width = SENSOR_WIDTH / 4;
            let object_x = (SENSOR_WIDTH - object_width) * step / frame_count.max(1);
            for y in SENSOR_HEIGHT / 3..2 * SENSOR_HEIGHT / 3 {
                for x in object_x..object_x + object_width {
                    frame.points[y * SENSOR_WIDTH + x] = DepthPoint {
                        depth_m: 0.6,
                        confidence: 60,
                    };
                }
            }
            frame
        })
        .collect()
}

fn load_settings() -> PipelineSettings {
    let Some(path) = std::env::var_os("DEPTH_GLOVE_SETTINGS") else {
        return PipelineSettings::default();
    };
    match store::load(std::path::Path::new(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            error!("cannot load settings from {path:?}: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let transform = match DepthTransform::new(settings.transform_config()) {
        Ok(transform) => transform,
        Err(e) => {
            error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let shutdown = ShutdownToken::new();
    let mut pipeline = Pipeline::new(transform, shutdown.clone());

    let motor_count = settings.tiles_per_side * settings.tiles_per_side;
    let mut glove = ConsumerThread::spawn(
        "glove",
        settings.consumer_queue_capacity,
        settings.idle_timeout(),
        shutdown.clone(),
        GloveDriver::new(ConsoleBoard::new(motor_count, settings.tiles_per_side)),
    );
    let mut preview = ConsumerThread::spawn(
        "preview",
        settings.consumer_queue_capacity,
        settings.idle_timeout(),
        shutdown.clone(),
        PreviewDriver::new(ConsolePreview::new(10)),
    );
    pipeline.add_tile_listener(Arc::new(glove.sink()));
    pipeline.add_greyscale_listener(Arc::new(preview.sink()));
    pipeline.start();

    // A recording stand-in; a live camera adapter plugs in the same way.
    let mut source = ReplaySource::new(sweep_scene(150), Duration::from_millis(40));
    let listener: Arc<dyn FrameListener> = Arc::new(pipeline.listener());
    if let Err(e) = source.start_capture(listener) {
        error!("cannot open frame source: {e}");
        std::process::exit(1);
    }

    // Play the recording to the end, then let the consumers idle out the
    // way they would when a camera goes quiet.
    source.wait();
    glove.join();
    preview.join();
    pipeline.stop();

    match serde_json::to_string(&pipeline.diagnostics()) {
        Ok(snapshot) => info!("run complete: {snapshot}"),
        Err(e) => error!("cannot serialise diagnostics: {e}"),
    }
}
