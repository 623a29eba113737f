use std::{
    env, fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

pub const HANDPOSE_MODEL_FILE: &str = "handpose_estimation_mediapipe_2023feb.onnx";
pub const HANDPOSE_MODEL_URL: &str = "https://github.com/opencv/opencv_zoo/raw/main/models/handpose_estimation_mediapipe/handpose_estimation_mediapipe_2023feb.onnx";

pub const FACE_MODEL_FILE: &str = "version-RFB-320.onnx";
pub const FACE_MODEL_URL: &str = "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/ultraface/models/version-RFB-320.onnx";

pub fn default_model_dir() -> PathBuf {
    env::var_os("RPS_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("models"))
}

pub fn handpose_model_path(dir: &Path) -> PathBuf {
    dir.join(HANDPOSE_MODEL_FILE)
}

pub fn face_model_path(dir: &Path) -> PathBuf {
    dir.join(FACE_MODEL_FILE)
}

/// Downloads `url` to `path` unless the file is already there.
pub fn ensure_model_available(path: &Path, url: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    log::info!("downloading {} to {}", url, path.display());
    let mut response = reqwest::blocking::Client::new()
        .get(url)
        .send()
        .with_context(|| format!("failed to request {url}"))?
        .error_for_status()?;

    let progress = match response.content_length() {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )?
                .progress_chars("=> "),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    };
    progress.set_message(
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );

    let partial = path.with_extension("part");
    let mut file = fs::File::create(&partial)
        .with_context(|| format!("failed to create {}", partial.display()))?;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = response.read(&mut buf)?;
        if read == 0 {
            break;
        }
        file.write_all(&buf[..read])?;
        progress.inc(read as u64);
    }
    file.flush()?;
    drop(file);

    fs::rename(&partial, path)
        .with_context(|| format!("failed to move model into {}", path.display()))?;
    progress.finish_with_message("done");
    Ok(())
}
