#[cfg(not(feature = "camera-nokhwa"))]
compile_error!("The game binary needs a camera backend: enable the camera-nokhwa feature.");

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use rps_vision::{
    assets::OverlaySet,
    config::{Args, GameConfig},
    game::RandomMoves,
    pipeline::{
        FrameOrchestrator,
        camera::{CameraSettings, CameraStream},
        recognizer::load_detectors,
    },
    ui::WindowPresenter,
};

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let wait = args.wait;
    let config = GameConfig::from(args);

    let overlays = OverlaySet::load(&config.asset_dir, config.overlay_max)?;
    let (hands, faces) = load_detectors(&config)?;

    if wait {
        wait_for_enter();
    }

    let camera = CameraStream::start(CameraSettings {
        index: config.camera_index,
        width: config.width,
        height: config.height,
        mirror: config.mirror,
    })
    .context("failed to start camera")?;
    let presenter = WindowPresenter::open(config.width, config.height, config.target_fps)?;

    let mut game = FrameOrchestrator::new(
        camera,
        hands,
        faces,
        presenter,
        RandomMoves::new(),
        overlays,
        &config,
    );
    game.run()
}

fn wait_for_enter() {
    print!("--wait given: press Enter when ready to start (bring the window forward) ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if let Err(err) = io::stdin().read_line(&mut line) {
        log::warn!("could not read from stdin, starting anyway: {err}");
    }
}
