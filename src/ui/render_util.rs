use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use image::RgbaImage;
use rayon::prelude::*;

use super::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::types::{BoundingBox, Frame};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(255, 255, 255);
    pub const BLACK: Color = Color(0, 0, 0);
    pub const GREEN: Color = Color(12, 255, 36);
    pub const BLUE: Color = Color(0, 0, 255);
    pub const YELLOW: Color = Color(255, 255, 0);
    pub const MAGENTA: Color = Color(255, 0, 255);
    pub const FINGER_UP: Color = Color(0, 200, 0);
    pub const FINGER_DOWN: Color = Color(200, 0, 0);
}

#[derive(Clone, Copy, Debug)]
pub struct TextStyle {
    pub scale: u32,
    pub color: Color,
}

pub fn put_pixel(frame: &mut Frame, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= frame.width as i32 || y >= frame.height as i32 {
        return;
    }
    let idx = (y as usize * frame.width as usize + x as usize) * 4;
    frame.rgba[idx..idx + 4].copy_from_slice(&[color.0, color.1, color.2, 255]);
}

pub fn fill_rect(frame: &mut Frame, x: i32, y: i32, w: i32, h: i32, color: Color) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(frame.width as i32);
    let y1 = (y + h).min(frame.height as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            put_pixel(frame, px, py, color);
        }
    }
}

/// Outline of `bbox`, `thickness` pixels wide, drawn inside the box.
pub fn draw_box(frame: &mut Frame, bbox: &BoundingBox, color: Color, thickness: i32) {
    let t = thickness.max(1);
    let BoundingBox {
        x,
        y,
        width,
        height,
    } = *bbox;
    fill_rect(frame, x, y, width, t, color);
    fill_rect(frame, x, y + height - t, width, t, color);
    fill_rect(frame, x, y, t, height, color);
    fill_rect(frame, x + width - t, y, t, height, color);
}

pub fn fill_circle(frame: &mut Frame, cx: i32, cy: i32, radius: i32, color: Color) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put_pixel(frame, cx + dx, cy + dy, color);
            }
        }
    }
}

pub fn draw_line(frame: &mut Frame, from: (i32, i32), to: (i32, i32), color: Color, thickness: i32) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let half = thickness.max(1) / 2;

    loop {
        fill_rect(frame, x - half, y - half, half * 2 + 1, half * 2 + 1, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draws `text` with its top-left corner at `origin`.
pub fn draw_text(frame: &mut Frame, text: &str, origin: (i32, i32), style: TextStyle) {
    let scale = style.scale.max(1) as i32;
    let mut pen_x = origin.0;
    for c in text.chars() {
        let rows = font::glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    fill_rect(
                        frame,
                        pen_x + col as i32 * scale,
                        origin.1 + row as i32 * scale,
                        scale,
                        scale,
                        style.color,
                    );
                }
            }
        }
        pen_x += ADVANCE as i32 * scale;
    }
}

/// Draws `text` horizontally centred around `center_y`, shrinking the scale
/// until it fits the frame width.
pub fn draw_text_centered(frame: &mut Frame, text: &str, center_y: i32, style: TextStyle) {
    let mut scale = style.scale.max(1);
    while scale > 1 && font::text_size(text, scale).0 > frame.width {
        scale -= 1;
    }
    let (w, _) = font::text_size(text, scale);
    let x = (frame.width as i32 - w as i32) / 2;
    let y = center_y - (GLYPH_HEIGHT * scale) as i32 / 2;
    draw_text(frame, text, (x, y), TextStyle { scale, ..style });
}

/// Copies `image` onto the frame at `origin`, clipping at the frame edges.
pub fn composite_overlay(frame: &mut Frame, image: &RgbaImage, origin: (i32, i32)) {
    let frame_w = frame.width as i32;
    let frame_h = frame.height as i32;
    let (img_w, img_h) = (image.width() as i32, image.height() as i32);

    let x0 = origin.0.max(0);
    let x1 = (origin.0 + img_w).min(frame_w);
    if x0 >= x1 {
        return;
    }
    let span = (x1 - x0) as usize * 4;
    let src_x = (x0 - origin.0) as usize * 4;
    let raw = image.as_raw();

    for y in origin.1.max(0)..(origin.1 + img_h).min(frame_h) {
        let src_row = (y - origin.1) as usize * img_w as usize * 4 + src_x;
        let dst_row = (y as usize * frame_w as usize + x0 as usize) * 4;
        frame.rgba[dst_row..dst_row + span].copy_from_slice(&raw[src_row..src_row + span]);
    }
}

/// Source rectangle `(left, top, width, height)` for [`resize_rgba`].
pub type Crop = (f64, f64, f64, f64);

/// Resamples an RGBA buffer (optionally a sub-rectangle of it) to `dst` size.
pub fn resize_rgba(
    rgba: &[u8],
    src: (u32, u32),
    crop: Option<Crop>,
    dst: (u32, u32),
) -> anyhow::Result<Vec<u8>> {
    let src_image = ImageRef::new(src.0, src.1, rgba, PixelType::U8x4)?;
    let mut dst_image = Image::new(dst.0.max(1), dst.1.max(1), PixelType::U8x4);

    let mut options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    if let Some((left, top, width, height)) = crop {
        options = options.crop(left, top, width, height);
    }

    Resizer::new().resize(&src_image, &mut dst_image, &options)?;
    Ok(dst_image.into_vec())
}

/// Packs the frame into the `0RGB` words a window buffer expects.
pub fn frame_to_argb(frame: &Frame, out: &mut Vec<u32>) {
    out.resize(frame.width as usize * frame.height as usize, 0);
    out.par_iter_mut()
        .zip(frame.rgba.par_chunks_exact(4))
        .for_each(|(dst, px)| {
            *dst = (px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32;
        });
}

/// Flips the frame left to right in place.
pub fn mirror_horizontally(frame: &mut Frame) {
    let row_len = frame.width as usize * 4;
    if row_len == 0 {
        return;
    }
    frame.rgba.par_chunks_mut(row_len).for_each(|row| {
        let pixels = row.len() / 4;
        for i in 0..pixels / 2 {
            let j = pixels - 1 - i;
            for c in 0..4 {
                row.swap(i * 4 + c, j * 4 + c);
            }
        }
    });
}
