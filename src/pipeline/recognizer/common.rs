use anyhow::{Result, anyhow};
use ndarray::Array4;

use crate::{
    geometry,
    types::{BoundingBox, Frame},
    ui::render_util,
};

pub const HANDPOSE_INPUT: u32 = 224;
pub const FACE_INPUT: (u32, u32) = (320, 240);
const LANDMARK_COUNT: usize = 21;

// Square crop around the previous hand: span multiplier and lower bound.
const TRACK_EXPAND: f32 = 1.8;
const TRACK_MIN_SIDE: f32 = 80.0;

/// Frame sub-rectangle fed to a model, in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn full(frame: &Frame) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: frame.width as f32,
            height: frame.height as f32,
        }
    }
}

/// Maps model input pixels back to frame pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    pub region: Region,
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    pub fn to_frame(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.region.left + (x - self.pad_x) / self.scale,
            self.region.top + (y - self.pad_y) / self.scale,
        )
    }
}

/// Square search window around the last seen hand, or the whole frame.
pub fn hand_region(frame: &Frame, previous: Option<&BoundingBox>) -> Region {
    let Some(prev) = previous else {
        return Region::full(frame);
    };

    let (fw, fh) = (frame.width as f32, frame.height as f32);
    let side = (prev.width.max(prev.height) as f32 * TRACK_EXPAND)
        .max(TRACK_MIN_SIDE)
        .min(fw.max(fh));
    let cx = prev.x as f32 + prev.width as f32 * 0.5;
    let cy = prev.y as f32 + prev.height as f32 * 0.5;

    let left = (cx - side * 0.5).clamp(0.0, (fw - 1.0).max(0.0));
    let top = (cy - side * 0.5).clamp(0.0, (fh - 1.0).max(0.0));
    Region {
        left,
        top,
        width: side.min(fw - left).max(1.0),
        height: side.min(fh - top).max(1.0),
    }
}

/// Letterboxes `region` into a `size` square NHWC tensor with values in 0..1.
pub fn prepare_letterboxed(frame: &Frame, region: Region, size: u32) -> Result<(Array4<f32>, Letterbox)> {
    let scale = size as f32 / region.width.max(region.height);
    let resized_w = ((region.width * scale).round() as u32).clamp(1, size);
    let resized_h = ((region.height * scale).round() as u32).clamp(1, size);
    let pad_x = (size - resized_w) / 2;
    let pad_y = (size - resized_h) / 2;

    let crop = (
        region.left as f64,
        region.top as f64,
        region.width as f64,
        region.height as f64,
    );
    let resized = render_util::resize_rgba(
        &frame.rgba,
        (frame.width, frame.height),
        Some(crop),
        (resized_w, resized_h),
    )?;

    let mut input = Array4::<f32>::zeros((1, size as usize, size as usize, 3));
    for (i, px) in resized.chunks_exact(4).enumerate() {
        let x = (i as u32 % resized_w + pad_x) as usize;
        let y = (i as u32 / resized_w + pad_y) as usize;
        for c in 0..3 {
            input[[0, y, x, c]] = px[c] as f32 / 255.0;
        }
    }

    Ok((
        input,
        Letterbox {
            region,
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
        },
    ))
}

/// Stretches the whole frame into an NCHW tensor normalised to about -1..1.
pub fn prepare_face_input(frame: &Frame) -> Result<Array4<f32>> {
    let (w, h) = FACE_INPUT;
    let resized = render_util::resize_rgba(&frame.rgba, (frame.width, frame.height), None, (w, h))?;

    let mut input = Array4::<f32>::zeros((1, 3, h as usize, w as usize));
    for (i, px) in resized.chunks_exact(4).enumerate() {
        let x = i % w as usize;
        let y = i / w as usize;
        for c in 0..3 {
            input[[0, c, y, x]] = (px[c] as f32 - 127.0) / 128.0;
        }
    }
    Ok(input)
}

pub fn decode_landmarks(flat: &[f32]) -> Result<Vec<[f32; 3]>> {
    if flat.len() < LANDMARK_COUNT * 3 {
        return Err(anyhow!(
            "expected {} landmark values, got {}",
            LANDMARK_COUNT * 3,
            flat.len()
        ));
    }
    Ok(flat
        .chunks_exact(3)
        .take(LANDMARK_COUNT)
        .map(|p| [p[0], p[1], p[2]])
        .collect())
}

pub fn project_landmarks(landmarks: &[[f32; 3]], letterbox: &Letterbox) -> Vec<(f32, f32)> {
    landmarks
        .iter()
        .map(|[x, y, _z]| letterbox.to_frame(*x, *y))
        .collect()
}

/// Turns per-anchor `(background, face)` scores and normalised corner boxes
/// into frame-pixel boxes above `threshold`, best first, duplicates merged.
pub fn decode_faces(
    scores: &[f32],
    boxes: &[f32],
    threshold: f32,
    iou_threshold: f32,
    frame: (u32, u32),
) -> Vec<BoundingBox> {
    let (fw, fh) = (frame.0 as f32, frame.1 as f32);
    let mut candidates: Vec<(BoundingBox, f32)> = scores
        .chunks_exact(2)
        .zip(boxes.chunks_exact(4))
        .filter(|(score, _)| score[1] >= threshold)
        .map(|(score, b)| {
            let x1 = (b[0] * fw) as i32;
            let y1 = (b[1] * fh) as i32;
            let x2 = (b[2] * fw) as i32;
            let y2 = (b[3] * fh) as i32;
            (BoundingBox::new(x1, y1, x2 - x1, y2 - y1), score[1])
        })
        .collect();

    non_max_suppression(&mut candidates, iou_threshold)
}

pub fn non_max_suppression(candidates: &mut [(BoundingBox, f32)], iou_threshold: f32) -> Vec<BoundingBox> {
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut keep: Vec<BoundingBox> = Vec::new();
    for (bbox, _) in candidates.iter() {
        if keep
            .iter()
            .all(|kept| geometry::iou(kept, bbox) <= iou_threshold)
        {
            keep.push(*bbox);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_round_trips_region_corners() {
        let letterbox = Letterbox {
            region: Region {
                left: 100.0,
                top: 50.0,
                width: 448.0,
                height: 224.0,
            },
            scale: 0.5,
            pad_x: 0.0,
            pad_y: 56.0,
        };
        assert_eq!(letterbox.to_frame(0.0, 56.0), (100.0, 50.0));
        assert_eq!(letterbox.to_frame(224.0, 168.0), (548.0, 274.0));
    }

    #[test]
    fn tracking_region_stays_inside_the_frame() {
        let frame = Frame::blank(640, 480);
        let prev = BoundingBox::new(600, 440, 60, 60);
        let region = hand_region(&frame, Some(&prev));
        assert!(region.left >= 0.0 && region.top >= 0.0);
        assert!(region.left + region.width <= 640.0);
        assert!(region.top + region.height <= 480.0);

        assert_eq!(hand_region(&frame, None), Region::full(&frame));
    }

    #[test]
    fn duplicate_faces_are_merged() {
        let scores = [0.1, 0.9, 0.2, 0.8, 0.7, 0.3, 0.05, 0.95];
        let boxes = [
            0.10, 0.10, 0.30, 0.40, // face
            0.11, 0.10, 0.31, 0.41, // same face, lower score
            0.50, 0.50, 0.60, 0.60, // below threshold
            0.70, 0.10, 0.90, 0.40, // second face
        ];
        let faces = decode_faces(&scores, &boxes, 0.7, 0.3, (640, 480));
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0], BoundingBox::new(448, 48, 128, 144));
        assert_eq!(faces[1].x, 64);
    }

    #[test]
    fn short_landmark_output_is_rejected() {
        assert!(decode_landmarks(&[0.0; 10]).is_err());
        assert_eq!(decode_landmarks(&[1.0; 63]).unwrap().len(), 21);
    }
}
