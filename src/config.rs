use std::path::PathBuf;

use clap::Parser;

use crate::{model_download::default_model_dir, round::RoundTiming};

#[derive(Parser, Debug)]
#[command(version, about = "Play Rock-Paper-Scissors against the computer with your webcam")]
pub struct Args {
    /// Wait for Enter before opening the camera
    #[arg(long)]
    pub wait: bool,

    /// Camera index to open
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Requested capture width
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Requested capture height
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Show the camera image as-is instead of mirrored
    #[arg(long)]
    pub no_mirror: bool,

    /// Directory holding the ONNX models (downloaded on first run)
    #[arg(long, env = "RPS_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Directory holding Rock.jpeg, Paper.jpeg and Scissor.jpeg
    #[arg(long, default_value = "images")]
    pub asset_dir: PathBuf,

    /// Minimum hand landmark confidence
    #[arg(long, default_value_t = 0.75)]
    pub hand_confidence: f32,

    /// Minimum face detection score
    #[arg(long, default_value_t = 0.6)]
    pub face_confidence: f32,

    /// Frames shown per countdown digit
    #[arg(long, default_value_t = 20)]
    pub countdown_frames: u32,

    /// Frames the round result stays on screen
    #[arg(long, default_value_t = 10)]
    pub result_frames: u32,
}

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub camera_index: u32,
    pub width: u32,
    pub height: u32,
    pub mirror: bool,
    pub model_dir: PathBuf,
    pub asset_dir: PathBuf,
    pub hand_confidence: f32,
    pub face_confidence: f32,
    pub timing: RoundTiming,
    pub overlay_max: (u32, u32),
    pub target_fps: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            width: 640,
            height: 480,
            mirror: true,
            model_dir: default_model_dir(),
            asset_dir: PathBuf::from("images"),
            hand_confidence: 0.75,
            face_confidence: 0.6,
            timing: RoundTiming::default(),
            overlay_max: (240, 180),
            target_fps: 30,
        }
    }
}

impl From<Args> for GameConfig {
    fn from(args: Args) -> Self {
        let defaults = GameConfig::default();
        Self {
            camera_index: args.camera,
            width: args.width,
            height: args.height,
            mirror: !args.no_mirror,
            model_dir: args.model_dir.unwrap_or(defaults.model_dir),
            asset_dir: args.asset_dir,
            hand_confidence: args.hand_confidence,
            face_confidence: args.face_confidence,
            timing: RoundTiming {
                frames_per_label: args.countdown_frames.max(1),
                result_frames: args.result_frames.max(1),
            },
            ..defaults
        }
    }
}
