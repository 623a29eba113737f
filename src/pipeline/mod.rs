#[cfg(feature = "camera-nokhwa")]
pub mod camera;
pub mod compositor;
pub mod recognizer;

use std::{mem, thread, time::Duration};

use anyhow::Result;

use crate::{
    assets::OverlaySet,
    config::GameConfig,
    error::CaptureError,
    game::MoveSource,
    gesture::FingerStateExtractor,
    overlay::{self, Placement},
    round::{self, HandReading, RoundFrame, RoundTiming, Session},
    types::{BoundingBox, FingerState, Frame},
};

use self::compositor::{FpsCounter, Scene};
pub use self::recognizer::{FaceDetector, HandDetector};

/// Pause after a failed camera read before trying again.
pub const CAPTURE_RETRY_DELAY: Duration = Duration::from_millis(100);

pub trait FrameSource {
    fn acquire_frame(&mut self) -> Result<Frame, CaptureError>;
}

pub trait Presenter {
    fn display(&mut self, frame: &Frame) -> Result<()>;
    fn poll_quit(&self) -> bool;
}

/// Summary of one processed frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub round: RoundFrame,
    pub fingers: Option<FingerState>,
    pub faces: Vec<BoundingBox>,
    pub hands_detected: usize,
    pub hands_drawn: usize,
    pub placement: Placement,
}

/// Drives one frame at a time: acquire, detect, advance the round, draw,
/// present.
pub struct FrameOrchestrator<S, H, F, P, M> {
    source: S,
    hands: H,
    faces: F,
    presenter: P,
    moves: M,
    extractor: FingerStateExtractor,
    overlays: OverlaySet,
    timing: RoundTiming,
    session: Session,
    fps: FpsCounter,
    retry_delay: Duration,
}

impl<S, H, F, P, M> FrameOrchestrator<S, H, F, P, M>
where
    S: FrameSource,
    H: HandDetector,
    F: FaceDetector,
    P: Presenter,
    M: MoveSource,
{
    pub fn new(
        source: S,
        hands: H,
        faces: F,
        presenter: P,
        moves: M,
        overlays: OverlaySet,
        config: &GameConfig,
    ) -> Self {
        Self {
            source,
            hands,
            faces,
            presenter,
            moves,
            extractor: FingerStateExtractor::new(config.mirror),
            overlays,
            timing: config.timing,
            session: Session::default(),
            fps: FpsCounter::new(),
            retry_delay: CAPTURE_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Runs until the presenter asks to quit or the camera goes away.
    pub fn run(&mut self) -> Result<()> {
        log::info!("game loop started");

        while !self.presenter.poll_quit() {
            if let Err(err) = self.tick() {
                if let Some(CaptureError::Closed) = err.downcast_ref::<CaptureError>() {
                    return Err(err);
                }
                log::warn!("frame skipped: {err:?}");
            }
        }

        log::info!(
            "quit requested, final score player {} computer {}",
            self.session.scores.player,
            self.session.scores.computer
        );
        Ok(())
    }

    /// Processes a single frame. `Ok(None)` means the camera had nothing this
    /// tick and no state changed.
    pub fn tick(&mut self) -> Result<Option<FrameReport>> {
        let frame = match self.source.acquire_frame() {
            Ok(frame) => frame,
            Err(CaptureError::Transient(reason)) => {
                log::warn!("failed to read frame from camera: {reason}");
                if !self.retry_delay.is_zero() {
                    thread::sleep(self.retry_delay);
                }
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        self.process_frame(frame).map(Some)
    }

    pub fn process_frame(&mut self, mut frame: Frame) -> Result<FrameReport> {
        let hands = self.hands.detect_hands(&frame).unwrap_or_else(|err| {
            log::warn!("hand detection failed: {err:?}");
            Vec::new()
        });
        let faces = self.faces.detect_faces(&frame).unwrap_or_else(|err| {
            log::warn!("face detection failed: {err:?}");
            Vec::new()
        });

        let primary = hands.first();
        let fingers =
            primary.and_then(|hand| self.extractor.extract(&hand.landmarks, hand.handedness));
        let reading = match primary {
            Some(_) => HandReading::Present(fingers),
            None => HandReading::Absent,
        };
        if let (Some(hand), Some(fingers)) = (primary, &fingers) {
            log::debug!("{} hand: {fingers}", hand.handedness.label());
        }

        let (session, round) = round::advance(
            mem::take(&mut self.session),
            reading,
            &mut self.moves,
            &self.timing,
        );
        self.session = session;

        let overlay = self.overlays.get(self.session.overlay);
        let placement = overlay::place_overlay(
            overlay.dimensions(),
            (frame.width, frame.height),
            &faces,
        );
        if !faces.is_empty() {
            log::debug!("{} face(s), overlay at {:?}", faces.len(), placement.corner);
        }
        let visible: Vec<_> = overlay::visible_hands(&hands, &faces).collect();
        let hands_drawn = visible.len();

        let scene = Scene {
            hands: visible,
            faces: &faces,
            fingers,
            overlay,
            placement,
            round: &round,
            scores: self.session.scores,
            fps: self.fps.tick(frame.timestamp),
        };
        compositor::compose(&mut frame, &scene);
        self.presenter.display(&frame)?;

        Ok(FrameReport {
            round,
            fingers,
            hands_detected: hands.len(),
            hands_drawn,
            faces,
            placement,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::{
        gesture::hand_with,
        overlay::Corner,
        types::{DetectedHand, Handedness, Move},
    };

    struct Script(VecDeque<Result<Frame, CaptureError>>);

    impl FrameSource for Script {
        fn acquire_frame(&mut self) -> Result<Frame, CaptureError> {
            self.0.pop_front().unwrap_or(Err(CaptureError::Closed))
        }
    }

    struct Hands(Vec<DetectedHand>);

    impl HandDetector for Hands {
        fn detect_hands(&mut self, _frame: &Frame) -> Result<Vec<DetectedHand>> {
            Ok(self.0.clone())
        }
    }

    struct Faces(Vec<BoundingBox>);

    impl FaceDetector for Faces {
        fn detect_faces(&mut self, _frame: &Frame) -> Result<Vec<BoundingBox>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Sink {
        shown: usize,
    }

    impl Presenter for Sink {
        fn display(&mut self, _frame: &Frame) -> Result<()> {
            self.shown += 1;
            Ok(())
        }

        fn poll_quit(&self) -> bool {
            false
        }
    }

    struct Fixed(Move);

    impl MoveSource for Fixed {
        fn next_move(&mut self) -> Move {
            self.0
        }
    }

    struct Broken;

    impl HandDetector for Broken {
        fn detect_hands(&mut self, _frame: &Frame) -> Result<Vec<DetectedHand>> {
            Err(anyhow::anyhow!("session crashed"))
        }
    }

    impl FaceDetector for Broken {
        fn detect_faces(&mut self, _frame: &Frame) -> Result<Vec<BoundingBox>> {
            Err(anyhow::anyhow!("session crashed"))
        }
    }

    /// Fails the first `failures` frames it is handed.
    struct Flaky {
        failures: usize,
        attempts: usize,
    }

    impl Presenter for Flaky {
        fn display(&mut self, _frame: &Frame) -> Result<()> {
            self.attempts += 1;
            if self.attempts <= self.failures {
                anyhow::bail!("window lost its surface");
            }
            Ok(())
        }

        fn poll_quit(&self) -> bool {
            false
        }
    }

    fn orchestrator(
        frames: Vec<Result<Frame, CaptureError>>,
        hands: Vec<DetectedHand>,
        faces: Vec<BoundingBox>,
    ) -> FrameOrchestrator<Script, Hands, Faces, Sink, Fixed> {
        let config = GameConfig::default();
        let overlays = OverlaySet::placeholders(config.overlay_max).unwrap();
        FrameOrchestrator::new(
            Script(frames.into()),
            Hands(hands),
            Faces(faces),
            Sink::default(),
            Fixed(Move::Rock),
            overlays,
            &config,
        )
        .with_retry_delay(Duration::ZERO)
    }

    #[test]
    fn transient_capture_failure_leaves_state_alone() {
        let mut orch = orchestrator(
            vec![Err(CaptureError::Transient("timeout".into()))],
            Vec::new(),
            Vec::new(),
        );
        assert!(orch.tick().unwrap().is_none());
        assert_eq!(orch.session(), &Session::default());
        assert_eq!(orch.presenter().shown, 0);
    }

    #[test]
    fn closed_camera_ends_the_loop() {
        let mut orch = orchestrator(vec![Ok(Frame::blank(640, 480))], Vec::new(), Vec::new());
        assert!(orch.run().is_err());
        assert_eq!(orch.session().counter, 1);
        assert_eq!(orch.presenter().shown, 1);
    }

    #[test]
    fn hands_over_faces_are_not_drawn_but_still_read() {
        let hand = DetectedHand {
            landmarks: hand_with(90.0, [true, true, false, false]),
            handedness: Handedness::Right,
        };
        let face = BoundingBox::new(50, 50, 200, 200);
        let mut orch = orchestrator(vec![Ok(Frame::blank(640, 480))], vec![hand], vec![face]);

        let report = orch.tick().unwrap().unwrap();
        assert_eq!(report.hands_detected, 1);
        assert_eq!(report.hands_drawn, 0);
        assert_eq!(
            report.fingers,
            Some(FingerState([true, true, true, false, false]))
        );
        assert_eq!(report.placement.corner, Corner::TopRight);
    }

    #[test]
    fn detector_failures_count_as_empty_frames() {
        let config = GameConfig::default();
        let overlays = OverlaySet::placeholders(config.overlay_max).unwrap();
        let mut orch = FrameOrchestrator::new(
            Script(vec![Ok(Frame::blank(640, 480)), Ok(Frame::blank(640, 480))].into()),
            Broken,
            Broken,
            Sink::default(),
            Fixed(Move::Rock),
            overlays,
            &config,
        );

        let report = orch.tick().unwrap().unwrap();
        assert_eq!(report.hands_detected, 0);
        assert!(report.faces.is_empty());
        assert_eq!(report.fingers, None);
        assert_eq!(report.placement.corner, Corner::TopLeft);

        assert!(orch.tick().unwrap().is_some());
        assert_eq!(orch.session().counter, 2);
        assert_eq!(orch.presenter().shown, 2);
    }

    #[test]
    fn display_failure_does_not_stop_the_loop() {
        let config = GameConfig::default();
        let overlays = OverlaySet::placeholders(config.overlay_max).unwrap();
        let frames = (0..3).map(|_| Ok(Frame::blank(640, 480))).collect();
        let mut orch = FrameOrchestrator::new(
            Script(frames),
            Hands(Vec::new()),
            Faces(Vec::new()),
            Flaky {
                failures: 1,
                attempts: 0,
            },
            Fixed(Move::Rock),
            overlays,
            &config,
        );

        let err = orch.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CaptureError>(),
            Some(CaptureError::Closed)
        ));
        assert_eq!(orch.presenter().attempts, 3);
        assert_eq!(orch.session().counter, 3);
    }
}
