use crate::{
    geometry::{hand_bounding_box, intersects_any},
    types::{BoundingBox, DetectedHand},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Placement priority.
    pub const ORDER: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    fn origin(self, overlay: (i32, i32), frame: (i32, i32)) -> (i32, i32) {
        let (w, h) = overlay;
        let (frame_w, frame_h) = frame;
        match self {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (frame_w - w, 0),
            Corner::BottomLeft => (0, frame_h - h),
            Corner::BottomRight => (frame_w - w, frame_h - h),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub corner: Corner,
    pub x: i32,
    pub y: i32,
}

/// Picks the first frame corner where an `overlay` sized image covers no face.
/// Falls back to the top-left corner when every corner is covered.
pub fn place_overlay(overlay: (u32, u32), frame: (u32, u32), faces: &[BoundingBox]) -> Placement {
    let overlay = (overlay.0 as i32, overlay.1 as i32);
    let frame = (frame.0 as i32, frame.1 as i32);

    Corner::ORDER
        .into_iter()
        .map(|corner| {
            let (x, y) = corner.origin(overlay, frame);
            Placement { corner, x, y }
        })
        .find(|p| {
            let rect = BoundingBox::new(p.x, p.y, overlay.0, overlay.1);
            !intersects_any(&rect, faces)
        })
        .unwrap_or(Placement {
            corner: Corner::TopLeft,
            x: 0,
            y: 0,
        })
}

/// Hands whose skeleton may be drawn: those not overlapping any face.
pub fn visible_hands<'a>(
    hands: &'a [DetectedHand],
    faces: &'a [BoundingBox],
) -> impl Iterator<Item = &'a DetectedHand> + 'a {
    hands.iter().filter(move |hand| {
        hand_bounding_box(&hand.landmarks).is_some_and(|bbox| !intersects_any(&bbox, faces))
    })
}
