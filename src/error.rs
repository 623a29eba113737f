use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// No frame this tick; the loop pauses briefly and tries again.
    #[error("no camera frame available: {0}")]
    Transient(String),
    #[error("camera stream closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("overlay image {} not found", .0.display())]
    Missing(PathBuf),
    #[error("failed to decode overlay image {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
