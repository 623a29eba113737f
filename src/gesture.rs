use crate::types::{FingerState, HAND_LANDMARKS, Handedness, LandmarkSet, Move};

const THUMB_TIP: usize = 4;
const THUMB_IP: usize = 3;
/// (tip, pip) pairs for index, middle, ring and pinky.
const FINGER_JOINTS: [(usize, usize); 4] = [(8, 6), (12, 10), (16, 14), (20, 18)];

/// Turns one hand's landmarks into per-finger up/down flags.
///
/// `mirrored` states whether the frame the landmarks came from was flipped
/// horizontally before detection. The thumb test depends on it: in a mirrored
/// view an extended right thumb points towards the left edge of the screen.
#[derive(Clone, Copy, Debug)]
pub struct FingerStateExtractor {
    mirrored: bool,
}

impl FingerStateExtractor {
    pub fn new(mirrored: bool) -> Self {
        Self { mirrored }
    }

    /// `None` when the set is too short to read all five fingers.
    pub fn extract(&self, landmarks: &LandmarkSet, handedness: Handedness) -> Option<FingerState> {
        if landmarks.len() < HAND_LANDMARKS {
            return None;
        }

        let tip = landmarks.get(THUMB_TIP)?;
        let ip = landmarks.get(THUMB_IP)?;
        let points_left = matches!(handedness, Handedness::Right) == self.mirrored;
        let thumb = if points_left { tip.x < ip.x } else { tip.x > ip.x };

        let mut fingers = [thumb, false, false, false, false];
        for (slot, (tip, pip)) in fingers[1..].iter_mut().zip(FINGER_JOINTS) {
            let tip = landmarks.get(tip)?;
            let pip = landmarks.get(pip)?;
            // Image y grows downwards.
            *slot = tip.y < pip.y;
        }

        Some(FingerState(fingers))
    }
}

impl Default for FingerStateExtractor {
    fn default() -> Self {
        Self::new(true)
    }
}

/// One entry of the classification policy. Returns `Some` when it decides.
pub struct GestureRule {
    pub name: &'static str,
    pub decide: fn(Option<&FingerState>) -> Option<Move>,
}

/// Evaluated top to bottom, the first rule that decides wins. The last rule
/// always decides, so classification is total.
pub const RULES: &[GestureRule] = &[
    GestureRule {
        name: "no-hand",
        decide: |fingers| fingers.is_none().then_some(Move::Rock),
    },
    GestureRule {
        name: "open-palm",
        decide: |fingers| {
            fingers
                .filter(|f| f.extended_count() == 5)
                .map(|_| Move::Paper)
        },
    },
    GestureRule {
        name: "victory",
        decide: |fingers| {
            fingers
                .filter(|f| f.index() && f.middle() && !f.ring() && !f.pinky())
                .map(|_| Move::Scissor)
        },
    },
    GestureRule {
        name: "fist",
        decide: |fingers| {
            fingers
                .filter(|f| f.extended_count() == 0)
                .map(|_| Move::Rock)
        },
    },
    GestureRule {
        name: "fallback",
        decide: |fingers| {
            let count = fingers.map_or(0, FingerState::extended_count);
            Some(if count >= 3 { Move::Paper } else { Move::Rock })
        },
    },
];

pub struct GestureClassifier;

impl GestureClassifier {
    pub fn classify(fingers: Option<&FingerState>) -> Move {
        Self::classify_with_rule(fingers).0
    }

    /// Like [`classify`](Self::classify) but also names the rule that decided.
    pub fn classify_with_rule(fingers: Option<&FingerState>) -> (Move, &'static str) {
        RULES
            .iter()
            .find_map(|rule| (rule.decide)(fingers).map(|mv| (mv, rule.name)))
            .unwrap_or((Move::Rock, "fallback"))
    }
}

#[cfg(test)]
pub(crate) fn hand_with(thumb_tip_x: f32, fingers_up: [bool; 4]) -> LandmarkSet {
    let mut points = vec![(100.0, 200.0); HAND_LANDMARKS];
    points[THUMB_IP] = (100.0, 150.0);
    points[THUMB_TIP] = (thumb_tip_x, 150.0);
    for ((tip, pip), up) in FINGER_JOINTS.into_iter().zip(fingers_up) {
        points[pip] = (120.0, 120.0);
        points[tip] = (120.0, if up { 80.0 } else { 140.0 });
    }
    LandmarkSet::from_points(&points)
}
