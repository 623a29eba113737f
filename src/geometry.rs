use crate::types::{BoundingBox, LandmarkSet};

/// Tight pixel box around a point cloud, `None` when there are no points.
pub fn bounding_box<I>(points: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = (f32, f32)>,
{
    let (min_x, max_x, min_y, max_y) = points.into_iter().fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |acc, (x, y)| {
            let (x, y) = (x as i32, y as i32);
            (acc.0.min(x), acc.1.max(x), acc.2.min(y), acc.3.max(y))
        },
    );

    if min_x > max_x || min_y > max_y {
        return None;
    }

    Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

pub fn hand_bounding_box(landmarks: &LandmarkSet) -> Option<BoundingBox> {
    bounding_box(landmarks.points())
}

/// Open-interval overlap on both axes; boxes that only share an edge do not
/// intersect.
pub fn intersects(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

pub fn intersects_any(a: &BoundingBox, others: &[BoundingBox]) -> bool {
    others.iter().any(|other| intersects(a, other))
}

/// Intersection over union, used to merge duplicate face candidates.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = a.right().min(b.right());
    let y2 = a.bottom().min(b.bottom());

    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }

    let intersection = ((x2 - x1) as i64 * (y2 - y1) as i64) as f32;
    let union = (a.area() + b.area()) as f32 - intersection;
    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(10, 0, 10, 10);
        assert!(!intersects(&a, &b));
        assert!(!intersects(&b, &a));
    }

    #[test]
    fn one_pixel_overlap_intersects() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(9, 0, 10, 10);
        assert!(intersects(&a, &b));
        assert!(intersects(&b, &a));
    }

    #[test]
    fn vertical_separation_is_not_an_intersection() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(5, 10, 10, 10);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn bounding_box_spans_points() {
        let bbox = bounding_box([(12.7, 40.0), (3.2, 8.9), (20.0, 15.5)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(3, 8, 17, 32));
    }

    #[test]
    fn bounding_box_of_nothing_is_none() {
        assert_eq!(bounding_box(std::iter::empty()), None);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(20, 20, 10, 10);
        assert_eq!(iou(&a, &b), 0.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }
}
