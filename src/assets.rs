use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;

use crate::{
    error::AssetError,
    types::{Frame, Move},
    ui::render_util::{self, Color, TextStyle},
};

/// Size of the generated placeholder art before it is scaled down.
const PLACEHOLDER_SIZE: (u32, u32) = (640, 480);

pub fn asset_path(dir: &Path, mv: Move) -> PathBuf {
    dir.join(format!("{}.jpeg", mv.label()))
}

pub fn load_overlay(path: &Path) -> Result<RgbaImage, AssetError> {
    if !path.exists() {
        return Err(AssetError::Missing(path.to_path_buf()));
    }
    let image = image::open(path).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Black card with `text` in large white letters.
pub fn placeholder(text: &str, width: u32, height: u32) -> RgbaImage {
    let mut frame = Frame::blank(width, height);
    render_util::fill_rect(
        &mut frame,
        0,
        0,
        width as i32,
        height as i32,
        Color::BLACK,
    );
    render_util::draw_text_centered(
        &mut frame,
        text,
        height as i32 / 2,
        TextStyle {
            scale: 12,
            color: Color::WHITE,
        },
    );

    RgbaImage::from_raw(width, height, frame.rgba)
        .unwrap_or_else(|| RgbaImage::new(width, height))
}

/// Shrinks `image` to fit within `max`, keeping its aspect ratio. Never
/// enlarges.
pub fn scale_to_fit(image: RgbaImage, max: (u32, u32)) -> Result<RgbaImage> {
    let (w, h) = image.dimensions();
    let scale = (max.0 as f32 / w as f32)
        .min(max.1 as f32 / h as f32)
        .min(1.0);
    if scale >= 1.0 {
        return Ok(image);
    }

    let target = (
        ((w as f32 * scale) as u32).max(1),
        ((h as f32 * scale) as u32).max(1),
    );
    let resized = render_util::resize_rgba(image.as_raw(), (w, h), None, target)?;
    RgbaImage::from_raw(target.0, target.1, resized)
        .ok_or_else(|| anyhow!("resized overlay has the wrong length"))
}

/// Overlay art for the computer's move, already scaled for compositing.
pub struct OverlaySet {
    rock: RgbaImage,
    paper: RgbaImage,
    scissor: RgbaImage,
}

impl OverlaySet {
    pub fn load(dir: &Path, max: (u32, u32)) -> Result<Self> {
        let load = |mv: Move| -> Result<RgbaImage> {
            let path = asset_path(dir, mv);
            let image = match load_overlay(&path) {
                Ok(image) => image,
                Err(err) => {
                    log::warn!("{err}, using a placeholder");
                    placeholder_for(mv)
                }
            };
            scale_to_fit(image, max)
                .with_context(|| format!("failed to scale {} overlay", mv.label()))
        };

        Ok(Self {
            rock: load(Move::Rock)?,
            paper: load(Move::Paper)?,
            scissor: load(Move::Scissor)?,
        })
    }

    /// Placeholders only, no disk access.
    pub fn placeholders(max: (u32, u32)) -> Result<Self> {
        Ok(Self {
            rock: scale_to_fit(placeholder_for(Move::Rock), max)?,
            paper: scale_to_fit(placeholder_for(Move::Paper), max)?,
            scissor: scale_to_fit(placeholder_for(Move::Scissor), max)?,
        })
    }

    pub fn get(&self, mv: Move) -> &RgbaImage {
        match mv {
            Move::Rock => &self.rock,
            Move::Paper => &self.paper,
            Move::Scissor => &self.scissor,
        }
    }
}

fn placeholder_for(mv: Move) -> RgbaImage {
    placeholder(
        &mv.label().to_ascii_uppercase(),
        PLACEHOLDER_SIZE.0,
        PLACEHOLDER_SIZE.1,
    )
}
