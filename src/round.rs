//! Frame-counter round cycle: a three step countdown, a single capture frame,
//! a short result window, then a wrap back to zero.
//!
//! The whole session lives in [`Session`], which is moved into [`advance`] and
//! handed back together with what the current frame should show.

use crate::{
    game::{MoveSource, resolve},
    gesture::GestureClassifier,
    types::{FingerState, Move, RoundResult, ScoreBoard},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundTiming {
    pub frames_per_label: u32,
    pub result_frames: u32,
}

impl RoundTiming {
    pub fn capture_frame(&self) -> u32 {
        self.frames_per_label * 3
    }

    pub fn reset_frame(&self) -> u32 {
        self.capture_frame() + self.result_frames
    }

    pub fn phase(&self, counter: u32) -> RoundPhase {
        let n = self.frames_per_label;
        match counter {
            c if c <= n => RoundPhase::Countdown1,
            c if c <= 2 * n => RoundPhase::Countdown2,
            c if c < self.capture_frame() => RoundPhase::Countdown3,
            c if c == self.capture_frame() => RoundPhase::Capture,
            c if c < self.reset_frame() => RoundPhase::ResultDisplay,
            _ => RoundPhase::Reset,
        }
    }
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            frames_per_label: 20,
            result_frames: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    Countdown1,
    Countdown2,
    Countdown3,
    Capture,
    ResultDisplay,
    /// Wrap frame: the counter returns to zero and the cached result is dropped.
    Reset,
}

impl RoundPhase {
    pub fn countdown_label(&self) -> Option<&'static str> {
        match self {
            RoundPhase::Countdown1 => Some("1"),
            RoundPhase::Countdown2 => Some("2"),
            RoundPhase::Countdown3 => Some("3"),
            _ => None,
        }
    }
}

/// What the detector saw of the player's hand on this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandReading {
    Absent,
    /// A hand was found; `None` when its landmarks could not be read.
    Present(Option<FingerState>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub counter: u32,
    pub scores: ScoreBoard,
    /// Result text cached at capture, shown until the wrap frame.
    pub status: Option<String>,
    /// Move whose overlay image is composited. Kept across rounds.
    pub overlay: Move,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            counter: 0,
            scores: ScoreBoard::default(),
            status: None,
            overlay: Move::Scissor,
        }
    }
}

/// Per-frame view of the round handed to the compositor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundFrame {
    pub phase: Option<RoundPhase>,
    /// Large centred text: countdown digit or result line.
    pub banner: Option<String>,
    /// Player move read at the capture frame.
    pub detected: Option<Move>,
    pub result: Option<RoundResult>,
}

pub fn advance<M>(
    session: Session,
    reading: HandReading,
    moves: &mut M,
    timing: &RoundTiming,
) -> (Session, RoundFrame)
where
    M: MoveSource + ?Sized,
{
    let mut session = session;
    session.counter += 1;
    let phase = timing.phase(session.counter);
    let mut frame = RoundFrame {
        phase: Some(phase),
        ..RoundFrame::default()
    };

    match phase {
        RoundPhase::Countdown1 | RoundPhase::Countdown2 | RoundPhase::Countdown3 => {
            frame.banner = phase.countdown_label().map(str::to_string);
        }
        RoundPhase::Capture => match reading {
            HandReading::Present(fingers) => {
                let (player, rule) = GestureClassifier::classify_with_rule(fingers.as_ref());
                let computer = moves.next_move();
                let result = resolve(player, computer, session.scores);
                log::info!(
                    "round: {} ({rule}) vs {} -> {}",
                    player,
                    computer,
                    result.display_text()
                );

                session.scores = result.scores;
                session.status = Some(result.display_text());
                session.overlay = computer;
                frame.detected = Some(player);
                frame.result = Some(result);
            }
            HandReading::Absent => {
                log::debug!("no hand at capture, round skipped");
            }
        },
        RoundPhase::ResultDisplay => {
            frame.banner = session.status.clone();
        }
        RoundPhase::Reset => {
            session.counter = 0;
            session.status = None;
        }
    }

    (session, frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    struct Fixed(Move);

    impl MoveSource for Fixed {
        fn next_move(&mut self) -> Move {
            self.0
        }
    }

    fn scissor_hand() -> HandReading {
        HandReading::Present(Some(FingerState([false, true, true, false, false])))
    }

    #[test]
    fn counter_walks_through_every_phase() {
        let timing = RoundTiming::default();
        let mut session = Session::default();
        let mut moves = Fixed(Move::Rock);
        let mut phases = Vec::new();

        for _ in 1..=70 {
            let (next, frame) = advance(session, HandReading::Absent, &mut moves, &timing);
            session = next;
            phases.push(frame.phase.unwrap());
        }

        for c in 1..=20 {
            assert_eq!(phases[c - 1], RoundPhase::Countdown1, "c={c}");
        }
        for c in 21..=40 {
            assert_eq!(phases[c - 1], RoundPhase::Countdown2, "c={c}");
        }
        for c in 41..=59 {
            assert_eq!(phases[c - 1], RoundPhase::Countdown3, "c={c}");
        }
        assert_eq!(phases[59], RoundPhase::Capture);
        for c in 61..=69 {
            assert_eq!(phases[c - 1], RoundPhase::ResultDisplay, "c={c}");
        }
        assert_eq!(phases[69], RoundPhase::Reset);
        assert_eq!(session.counter, 0);
    }

    #[test]
    fn countdown_frames_carry_their_digit() {
        let timing = RoundTiming::default();
        let mut moves = Fixed(Move::Rock);
        let session = Session {
            counter: 40,
            ..Session::default()
        };
        let (_, frame) = advance(session, HandReading::Absent, &mut moves, &timing);
        assert_eq!(frame.banner.as_deref(), Some("3"));
    }

    #[test]
    fn capture_scores_and_caches_the_result() {
        let timing = RoundTiming::default();
        let mut moves = Fixed(Move::Paper);
        let session = Session {
            counter: 59,
            ..Session::default()
        };

        let (session, frame) = advance(session, scissor_hand(), &mut moves, &timing);
        let result = frame.result.unwrap();
        assert_eq!(result.outcome, Outcome::PlayerWin);
        assert_eq!(frame.detected, Some(Move::Scissor));
        assert_eq!(session.scores, ScoreBoard { player: 1, computer: 0 });
        assert_eq!(session.overlay, Move::Paper);
        assert_eq!(
            session.status.as_deref(),
            Some("Player wins: Scissor beats Paper")
        );

        let (session, frame) = advance(session, HandReading::Absent, &mut moves, &timing);
        assert_eq!(frame.phase, Some(RoundPhase::ResultDisplay));
        assert_eq!(
            frame.banner.as_deref(),
            Some("Player wins: Scissor beats Paper")
        );
        assert!(frame.result.is_none());
        assert_eq!(session.scores.player, 1);
    }

    #[test]
    fn unreadable_hand_at_capture_plays_rock() {
        let timing = RoundTiming::default();
        let mut moves = Fixed(Move::Scissor);
        let session = Session {
            counter: 59,
            ..Session::default()
        };
        let (session, frame) = advance(session, HandReading::Present(None), &mut moves, &timing);
        assert_eq!(frame.detected, Some(Move::Rock));
        assert_eq!(session.scores.player, 1);
    }

    #[test]
    fn missing_hand_at_capture_skips_the_round() {
        let timing = RoundTiming::default();
        let mut moves = Fixed(Move::Rock);
        let session = Session {
            counter: 59,
            scores: ScoreBoard {
                player: 3,
                computer: 4,
            },
            ..Session::default()
        };

        let (session, frame) = advance(session, HandReading::Absent, &mut moves, &timing);
        assert_eq!(frame.phase, Some(RoundPhase::Capture));
        assert!(frame.result.is_none());
        assert_eq!(session.scores, ScoreBoard { player: 3, computer: 4 });
        assert_eq!(session.status, None);

        let (_, frame) = advance(session, HandReading::Absent, &mut moves, &timing);
        assert_eq!(frame.phase, Some(RoundPhase::ResultDisplay));
        assert_eq!(frame.banner, None);
    }

    #[test]
    fn overlay_move_survives_into_the_next_countdown() {
        let timing = RoundTiming::default();
        let mut moves = Fixed(Move::Rock);
        let mut session = Session {
            counter: 59,
            ..Session::default()
        };
        assert_eq!(session.overlay, Move::Scissor);

        let (next, _) = advance(session, scissor_hand(), &mut moves, &timing);
        session = next;
        for _ in 0..30 {
            let (next, _) = advance(session, HandReading::Absent, &mut moves, &timing);
            session = next;
        }
        assert_eq!(timing.phase(session.counter), RoundPhase::Countdown1);
        assert_eq!(session.overlay, Move::Rock);
        assert_eq!(session.status, None);
        assert_eq!(session.scores.computer, 1);
    }

    #[test]
    fn timing_scales_with_cadence() {
        let timing = RoundTiming {
            frames_per_label: 5,
            result_frames: 3,
        };
        assert_eq!(timing.phase(5), RoundPhase::Countdown1);
        assert_eq!(timing.phase(10), RoundPhase::Countdown2);
        assert_eq!(timing.phase(14), RoundPhase::Countdown3);
        assert_eq!(timing.phase(15), RoundPhase::Capture);
        assert_eq!(timing.phase(17), RoundPhase::ResultDisplay);
        assert_eq!(timing.phase(18), RoundPhase::Reset);
    }
}
