use previz_ar::app::{AppError, HeadlessSensor, LoggingRenderer, Session, SessionConfig};
use previz_ar::media::UnavailableCapture;
use previz_ar::scene::serialization::load_scene_from_file;
use previz_ar::scene::SceneState;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = SessionConfig::parse();
    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: SessionConfig) -> Result<(), AppError> {
    let mut scene = SceneState::new();
    if let Some(path) = &config.scene {
        load_scene_from_file(path)?.apply_to(&mut scene);
    }

    let start = Instant::now();
    let mut session = Session::new(
        scene,
        Box::new(HeadlessSensor {
            gated: config.motion_gate,
        }),
        Box::new(UnavailableCapture),
        start,
    );
    log::info!("{}", session.summary());

    // Frames run back to back on a simulated clock.
    let mut renderer = LoggingRenderer::default();
    for index in 0..config.frames {
        session.frame(&mut renderer, start + config.frame_interval * index);
    }
    session.shutdown();

    match renderer.last_frame() {
        Some(frame) => println!("{}", serde_json::to_string_pretty(frame)?),
        None => log::info!("No frames rendered"),
    }
    Ok(())
}
