use std::{fmt, time::Instant};

#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl Frame {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            rgba: vec![0; width as usize * height as usize * 4],
            width,
            height,
            timestamp: Instant::now(),
        }
    }
}

/// Number of points in a hand skeleton.
pub const HAND_LANDMARKS: usize = 21;

/// A named hand skeleton point in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub id: usize,
    pub x: f32,
    pub y: f32,
}

/// Landmarks of one detected hand, ordered by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkSet(pub Vec<Landmark>);

impl LandmarkSet {
    pub fn from_points(points: &[(f32, f32)]) -> Self {
        Self(
            points
                .iter()
                .enumerate()
                .map(|(id, &(x, y))| Landmark { id, x, y })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Landmark> {
        self.0.get(id)
    }

    pub fn points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.0.iter().map(|lm| (lm.x, lm.y))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn label(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    pub landmarks: LandmarkSet,
    pub handedness: Handedness,
}

/// Up/down state of each finger, ordered thumb, index, middle, ring, pinky.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerState(pub [bool; 5]);

impl FingerState {
    pub const LABELS: [&'static str; 5] = ["T", "I", "M", "R", "P"];

    pub fn thumb(&self) -> bool {
        self.0[0]
    }

    pub fn index(&self) -> bool {
        self.0[1]
    }

    pub fn middle(&self) -> bool {
        self.0[2]
    }

    pub fn ring(&self) -> bool {
        self.0[3]
    }

    pub fn pinky(&self) -> bool {
        self.0[4]
    }

    pub fn extended_count(&self) -> usize {
        self.0.iter().filter(|up| **up).count()
    }
}

impl fmt::Display for FingerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, up) in Self::LABELS.iter().zip(self.0) {
            write!(f, "{}{}", label, if up { '^' } else { '_' })?;
        }
        Ok(())
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Rock,
    Paper,
    Scissor,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissor];

    pub fn label(&self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissor => "Scissor",
        }
    }

    /// The move this one defeats.
    pub fn beats_target(&self) -> Move {
        match self {
            Move::Rock => Move::Scissor,
            Move::Paper => Move::Rock,
            Move::Scissor => Move::Paper,
        }
    }

    pub fn beats(&self, other: Move) -> bool {
        self.beats_target() == other
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    pub player: u32,
    pub computer: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Tie,
    PlayerWin,
    ComputerWin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundResult {
    pub outcome: Outcome,
    pub player_move: Move,
    pub computer_move: Move,
    pub scores: ScoreBoard,
}

impl RoundResult {
    pub fn display_text(&self) -> String {
        match self.outcome {
            Outcome::Tie => format!("Tie: both {}", self.player_move),
            Outcome::PlayerWin => format!(
                "Player wins: {} beats {}",
                self.player_move, self.computer_move
            ),
            Outcome::ComputerWin => format!(
                "Computer wins: {} beats {}",
                self.computer_move, self.player_move
            ),
        }
    }
}
