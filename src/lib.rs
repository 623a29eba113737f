pub mod assets;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod gesture;
pub mod model_download;
pub mod overlay;
pub mod pipeline;
pub mod round;
pub mod types;
pub mod ui;
