use std::time::Instant;

use image::RgbaImage;

use crate::{
    overlay::Placement,
    round::RoundFrame,
    types::{BoundingBox, DetectedHand, FingerState, Frame, LandmarkSet, ScoreBoard},
    ui::{
        font,
        render_util::{self, Color, TextStyle},
    },
};

/// Bone list of the 21 point hand skeleton.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

const BANNER_Y: i32 = 250;
const DETECTED_Y: i32 = 190;
const BANNER_SCALE: u32 = 8;
const RESULT_SCALE: u32 = 3;
const SMALL_SCALE: u32 = 2;
const INDICATOR_RADIUS: i32 = 12;
const INDICATOR_SPACING: i32 = 40;

/// Everything drawn on top of one camera frame.
pub struct Scene<'a> {
    pub hands: Vec<&'a DetectedHand>,
    pub faces: &'a [BoundingBox],
    pub fingers: Option<FingerState>,
    pub overlay: &'a RgbaImage,
    pub placement: Placement,
    pub round: &'a RoundFrame,
    pub scores: ScoreBoard,
    pub fps: f32,
}

pub fn compose(frame: &mut Frame, scene: &Scene<'_>) {
    for hand in &scene.hands {
        draw_landmarks(frame, &hand.landmarks);
    }
    for face in scene.faces {
        render_util::draw_box(frame, face, Color::YELLOW, 2);
    }
    if let Some(fingers) = scene.fingers {
        draw_finger_indicators(frame, &fingers);
    }

    render_util::composite_overlay(
        frame,
        scene.overlay,
        (scene.placement.x, scene.placement.y),
    );

    if let Some(detected) = scene.round.detected {
        render_util::draw_text_centered(
            frame,
            detected.label(),
            DETECTED_Y,
            TextStyle {
                scale: 5,
                color: Color::GREEN,
            },
        );
    }
    if let Some(banner) = &scene.round.banner {
        let scale = if banner.chars().count() == 1 {
            BANNER_SCALE
        } else {
            RESULT_SCALE
        };
        render_util::draw_text_centered(
            frame,
            banner,
            BANNER_Y,
            TextStyle {
                scale,
                color: Color::GREEN,
            },
        );
    }

    draw_scores(frame, scene.scores);
    render_util::draw_text(
        frame,
        &format!("fps : {}", scene.fps as u32),
        (frame.width as i32 / 2 - 50, 50),
        TextStyle {
            scale: SMALL_SCALE,
            color: Color::BLUE,
        },
    );
}

pub fn draw_landmarks(frame: &mut Frame, landmarks: &LandmarkSet) {
    if landmarks.is_empty() {
        return;
    }
    for (a, b) in HAND_CONNECTIONS {
        if let (Some(a), Some(b)) = (landmarks.get(a), landmarks.get(b)) {
            render_util::draw_line(
                frame,
                (a.x as i32, a.y as i32),
                (b.x as i32, b.y as i32),
                Color::WHITE,
                2,
            );
        }
    }
    for (x, y) in landmarks.points() {
        render_util::fill_circle(frame, x as i32, y as i32, 4, Color::MAGENTA);
    }
}

fn draw_finger_indicators(frame: &mut Frame, fingers: &FingerState) {
    let base_x = 60;
    let base_y = frame.height as i32 - 80;

    for (idx, (label, up)) in FingerState::LABELS.iter().zip(fingers.0).enumerate() {
        let cx = base_x + idx as i32 * INDICATOR_SPACING;
        let color = if up {
            Color::FINGER_UP
        } else {
            Color::FINGER_DOWN
        };
        render_util::fill_circle(frame, cx, base_y, INDICATOR_RADIUS, color);
        render_util::draw_text(
            frame,
            label,
            (cx - 5, base_y + INDICATOR_RADIUS + 4),
            TextStyle {
                scale: SMALL_SCALE,
                color: Color::WHITE,
            },
        );
    }
}

fn draw_scores(frame: &mut Frame, scores: ScoreBoard) {
    let style = TextStyle {
        scale: SMALL_SCALE,
        color: Color::BLUE,
    };
    let y = frame.height as i32 - 28;

    render_util::draw_text(
        frame,
        &format!("Computer Score : {}", scores.computer),
        (30, y),
        style,
    );

    let player = format!("Player Score {}", scores.player);
    let (w, _) = font::text_size(&player, SMALL_SCALE);
    render_util::draw_text(frame, &player, (frame.width as i32 - w as i32 - 30, y), style);
}

/// Frames per second from the gap between consecutive frames.
pub struct FpsCounter {
    last: Option<Instant>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn tick(&mut self, now: Instant) -> f32 {
        let fps = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .filter(|secs| *secs > 0.0)
            .map_or(0.0, |secs| 1.0 / secs);
        self.last = Some(now);
        fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn fps_comes_from_frame_spacing() {
        let mut fps = FpsCounter::new();
        let start = Instant::now();
        assert_eq!(fps.tick(start), 0.0);
        let rate = fps.tick(start + Duration::from_millis(50));
        assert!((rate - 20.0).abs() < 0.01);
    }

    #[test]
    fn empty_landmark_set_draws_nothing() {
        let mut frame = Frame::blank(32, 32);
        draw_landmarks(&mut frame, &LandmarkSet::default());
        assert!(frame.rgba.iter().all(|b| *b == 0));

        draw_landmarks(&mut frame, &LandmarkSet::from_points(&[(16.0, 16.0)]));
        assert!(frame.rgba.iter().any(|b| *b != 0));
    }
}
