mod common;
mod ort;

use anyhow::Result;

use crate::{
    config::GameConfig,
    model_download::{
        FACE_MODEL_URL, HANDPOSE_MODEL_URL, ensure_model_available, face_model_path,
        handpose_model_path,
    },
    types::{BoundingBox, DetectedHand, Frame, Handedness},
};

pub use self::ort::{OrtFaceDetector, OrtHandDetector};

pub trait HandDetector {
    /// Hands in the frame, landmarks in frame pixels. Empty when none.
    fn detect_hands(&mut self, frame: &Frame) -> Result<Vec<DetectedHand>>;
}

pub trait FaceDetector {
    fn detect_faces(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>>;
}

/// The landmark model labels hands as they appear in a mirrored image. On a
/// raw frame the label is swapped so it names the subject's own hand.
pub(crate) fn handedness_from_score(score: f32, mirrored: bool) -> Handedness {
    let label = if score >= 0.5 {
        Handedness::Right
    } else {
        Handedness::Left
    };
    match (label, mirrored) {
        (label, true) => label,
        (Handedness::Right, false) => Handedness::Left,
        (Handedness::Left, false) => Handedness::Right,
    }
}

/// Fetches the models if needed and opens both sessions.
pub fn load_detectors(config: &GameConfig) -> Result<(OrtHandDetector, OrtFaceDetector)> {
    let handpose_path = handpose_model_path(&config.model_dir);
    let face_path = face_model_path(&config.model_dir);

    if let Err(err) = ensure_model_available(&handpose_path, HANDPOSE_MODEL_URL) {
        log::error!(
            "failed to prepare handpose model at {}: {err:?}",
            handpose_path.display()
        );
        return Err(err);
    }
    if let Err(err) = ensure_model_available(&face_path, FACE_MODEL_URL) {
        log::error!(
            "failed to prepare face model at {}: {err:?}",
            face_path.display()
        );
        return Err(err);
    }

    let hands = OrtHandDetector::new(&handpose_path, config.hand_confidence, config.mirror)?;
    let faces = OrtFaceDetector::new(&face_path, config.face_confidence)?;
    log::info!(
        "vision backend ready using {} and {}",
        handpose_path.display(),
        face_path.display()
    );

    Ok((hands, faces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{FingerStateExtractor, hand_with};

    #[test]
    fn mirrored_frames_keep_the_model_label() {
        assert_eq!(handedness_from_score(0.9, true), Handedness::Right);
        assert_eq!(handedness_from_score(0.1, true), Handedness::Left);
    }

    #[test]
    fn raw_frames_swap_the_model_label() {
        assert_eq!(handedness_from_score(0.9, false), Handedness::Left);
        assert_eq!(handedness_from_score(0.1, false), Handedness::Right);
    }

    #[test]
    fn raw_right_thumb_reads_as_extended() {
        // Subject's right thumb pointing right on an unmirrored frame; the
        // model reports it as a left hand.
        let extractor = FingerStateExtractor::new(false);
        let hand = hand_with(110.0, [false; 4]);
        let handedness = handedness_from_score(0.1, false);
        assert_eq!(handedness, Handedness::Right);
        assert!(extractor.extract(&hand, handedness).unwrap().thumb());
    }
}
