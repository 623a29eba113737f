use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{
    FaceDetector, HandDetector,
    common::{self, HANDPOSE_INPUT},
    handedness_from_score,
};
use crate::{
    geometry,
    types::{BoundingBox, DetectedHand, Frame, LandmarkSet},
};

const FACE_IOU_THRESHOLD: f32 = 0.3;

fn build_session(model_path: &Path) -> Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(2)?
        .commit_from_file(model_path)
        .with_context(|| format!("failed to load ORT session from {}", model_path.display()))
}

/// Single-hand landmark model. Searches the whole frame until a hand is
/// found, then a window around the last hand.
pub struct OrtHandDetector {
    session: Session,
    min_confidence: f32,
    mirrored: bool,
    last_hand: Option<BoundingBox>,
}

impl OrtHandDetector {
    /// `mirrored` states whether the frames passed in were flipped
    /// horizontally.
    pub fn new(model_path: &Path, min_confidence: f32, mirrored: bool) -> Result<Self> {
        Ok(Self {
            session: build_session(model_path)?,
            min_confidence,
            mirrored,
            last_hand: None,
        })
    }
}

impl HandDetector for OrtHandDetector {
    fn detect_hands(&mut self, frame: &Frame) -> Result<Vec<DetectedHand>> {
        let region = common::hand_region(frame, self.last_hand.as_ref());
        let (input, letterbox) = common::prepare_letterboxed(frame, region, HANDPOSE_INPUT)?;
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("failed to run handpose session")?;

        if outputs.len() < 3 {
            return Err(anyhow!("handpose model returned {} outputs", outputs.len()));
        }

        let coords = outputs[0].try_extract_array::<f32>()?;
        let flattened: Vec<f32> = coords.iter().copied().collect();
        let first_value = |idx: usize| {
            outputs[idx]
                .try_extract_array::<f32>()
                .ok()
                .and_then(|arr| arr.iter().next().copied())
                .unwrap_or(0.0)
        };
        let confidence = first_value(1);
        let handedness = first_value(2);
        drop(outputs);

        if confidence < self.min_confidence {
            self.last_hand = None;
            return Ok(Vec::new());
        }

        let landmarks = common::decode_landmarks(&flattened)?;
        let projected = common::project_landmarks(&landmarks, &letterbox);
        self.last_hand = geometry::bounding_box(projected.iter().copied());

        Ok(vec![DetectedHand {
            landmarks: LandmarkSet::from_points(&projected),
            handedness: handedness_from_score(handedness, self.mirrored),
        }])
    }
}

/// Lightweight anchor-box face detector.
pub struct OrtFaceDetector {
    session: Session,
    min_score: f32,
}

impl OrtFaceDetector {
    pub fn new(model_path: &Path, min_score: f32) -> Result<Self> {
        Ok(Self {
            session: build_session(model_path)?,
            min_score,
        })
    }
}

impl FaceDetector for OrtFaceDetector {
    fn detect_faces(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>> {
        let input = common::prepare_face_input(frame)?;
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("failed to run face session")?;

        if outputs.len() < 2 {
            return Err(anyhow!("face model returned {} outputs", outputs.len()));
        }

        let scores: Vec<f32> = outputs[0].try_extract_array::<f32>()?.iter().copied().collect();
        let boxes: Vec<f32> = outputs[1].try_extract_array::<f32>()?.iter().copied().collect();

        Ok(common::decode_faces(
            &scores,
            &boxes,
            self.min_score,
            FACE_IOU_THRESHOLD,
            (frame.width, frame.height),
        ))
    }
}
