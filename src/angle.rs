//! Joint angle calculation
//!
//! Interior angle at a vertex joint from the dot product of the two limb
//! segments meeting there.

use crate::types::Point;

/// Interior angle at `vertex` in degrees, in `[0, 180]`.
///
/// cos(θ) = (v1 · v2) / (|v1| × |v2|), with the cosine clamped to `[-1, 1]`
/// before `acos`. Returns 0 when either segment has zero length.
pub fn joint_angle(proximal: Point, vertex: Point, distal: Point) -> f64 {
    let v1 = (proximal.x - vertex.x, proximal.y - vertex.y);
    let v2 = (distal.x - vertex.x, distal.y - vertex.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Like [`joint_angle`], but `None` for non-finite coordinates or results and
/// for a zero-length segment
pub fn checked_joint_angle(proximal: Point, vertex: Point, distal: Point) -> Option<f64> {
    if !(proximal.is_finite() && vertex.is_finite() && distal.is_finite()) {
        return None;
    }
    if proximal == vertex || distal == vertex {
        return None;
    }

    let angle = joint_angle(proximal, vertex, distal);
    angle.is_finite().then_some(angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_straight_limb() {
        let angle = joint_angle(p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle() {
        let angle = joint_angle(p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.5));
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_folded_limb() {
        let angle = joint_angle(p(1.0, 0.0), p(0.0, 0.0), p(2.0, 0.0));
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn test_symmetry() {
        let samples = [
            (p(10.0, 3.0), p(4.0, 4.0), p(-2.0, 9.5)),
            (p(0.1, 0.9), p(0.3, 0.4), p(0.8, 0.2)),
            (p(-5.0, -5.0), p(1.0, 0.0), p(7.0, -1.0)),
        ];

        for (a, b, c) in samples {
            let forward = joint_angle(a, b, c);
            let backward = joint_angle(c, b, a);
            assert!((forward - backward).abs() < 1e-9);
            assert!((0.0..=180.0).contains(&forward));
        }
    }

    #[test]
    fn test_degenerate_segments_return_zero() {
        assert_eq!(joint_angle(p(1.0, 1.0), p(1.0, 1.0), p(3.0, 4.0)), 0.0);
        assert_eq!(joint_angle(p(3.0, 4.0), p(1.0, 1.0), p(1.0, 1.0)), 0.0);
        assert_eq!(joint_angle(p(1.0, 1.0), p(1.0, 1.0), p(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_collinear_overshoot_is_clamped() {
        // Large, nearly collinear coordinates push the raw cosine past 1.0
        let angle = joint_angle(p(1e8, 1e8 + 1.0), p(0.0, 0.0), p(3e8, 3e8 + 3.0));
        assert!(angle.is_finite());
        assert!(angle < 1e-3);
    }

    #[test]
    fn test_checked_rejects_non_finite() {
        assert_eq!(
            checked_joint_angle(p(f64::NAN, 0.0), p(0.0, 0.0), p(1.0, 1.0)),
            None
        );
        assert_eq!(
            checked_joint_angle(p(0.0, 1.0), p(0.0, f64::INFINITY), p(1.0, 1.0)),
            None
        );

        let angle = checked_joint_angle(p(0.0, 1.0), p(0.0, 0.0), p(1.0, 0.0)).unwrap();
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_checked_rejects_collapsed_segment() {
        assert_eq!(
            checked_joint_angle(p(1.0, 1.0), p(1.0, 1.0), p(3.0, 4.0)),
            None
        );
        assert_eq!(
            checked_joint_angle(p(3.0, 4.0), p(1.0, 1.0), p(1.0, 1.0)),
            None
        );

        // A folded limb has two real segments and stays measurable
        let angle = checked_joint_angle(p(1.0, 0.0), p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        assert!(angle.abs() < 1e-9);
    }
}
