//! Polyline simplification for freehand strokes.
//!
//! A cheap radial-distance pass drops points that sit too close to their
//! predecessor, then Ramer-Douglas-Peucker removes points that lie within
//! `tolerance` of the segment joining the points kept around them.

use kurbo::Point;

/// Simplify `points` with both passes. `tolerance` is a distance in
/// surface pixels; the result always keeps the first and last point.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    simplify_with(points, tolerance, false)
}

/// Like [`simplify`]; `highest_quality` skips the radial pre-pass.
pub fn simplify_with(points: &[Point], tolerance: f64, highest_quality: bool) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let sq_tolerance = tolerance * tolerance;
    if highest_quality {
        douglas_peucker(points, sq_tolerance)
    } else {
        douglas_peucker(&radial_distance(points, sq_tolerance), sq_tolerance)
    }
}

/// Keep a point only when it is farther than the tolerance from the last kept one.
fn radial_distance(points: &[Point], sq_tolerance: f64) -> Vec<Point> {
    let last_index = points.len() - 1;
    let mut kept = vec![points[0]];
    let mut prev = 0;

    for (i, point) in points.iter().enumerate().skip(1) {
        if point.distance_squared(points[prev]) > sq_tolerance {
            kept.push(*point);
            prev = i;
        }
    }

    if prev != last_index {
        kept.push(points[last_index]);
    }
    kept
}

fn douglas_peucker(points: &[Point], sq_tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = segment_distance_squared(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > sq_tolerance {
        let mut left = douglas_peucker(&points[..=max_index], sq_tolerance);
        let right = douglas_peucker(&points[max_index..], sq_tolerance);

        // The split point ends `left` and starts `right`
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Squared distance from `point` to the segment `a`-`b`.
fn segment_distance_squared(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return point.distance_squared(a);
    }

    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance_squared(a + seg * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_subsequence(sub: &[Point], of: &[Point]) -> bool {
        let mut it = of.iter();
        sub.iter().all(|p| it.any(|q| q == p))
    }

    #[test]
    fn test_degenerate_inputs_unchanged() {
        assert!(simplify(&[], 1.0).is_empty());
        let one = [Point::new(3.0, 4.0)];
        assert_eq!(simplify(&one, 1.0), one.to_vec());
        let two = [Point::new(0.0, 0.0), Point::new(0.1, 0.0)];
        assert_eq!(simplify(&two, 5.0), two.to_vec());
    }

    #[test]
    fn test_collinear_points_collapse() {
        let points: Vec<Point> = (0..20).map(|i| Point::new(i as f64, 0.0)).collect();
        let out = simplify(&points, 0.5);
        assert_eq!(out, vec![points[0], points[19]]);
    }

    #[test]
    fn test_corner_is_kept() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
        ];
        let out = simplify(&points, 1.0);
        assert_eq!(out, vec![points[0], points[2], points[4]]);
    }

    #[test]
    fn test_output_is_subsequence_with_endpoints() {
        let points: Vec<Point> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.1;
                Point::new(t * 10.0, (t * 3.0).sin() * 20.0 + (i % 3) as f64 * 0.4)
            })
            .collect();
        for tolerance in [0.0, 0.3, 0.8, 1.0, 4.0] {
            for hq in [false, true] {
                let out = simplify_with(&points, tolerance, hq);
                assert_eq!(out.first(), points.first());
                assert_eq!(out.last(), points.last());
                assert!(out.len() <= points.len());
                assert!(is_subsequence(&out, &points));
            }
        }
    }

    #[test]
    fn test_zero_tolerance_keeps_distinct_bends() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 1.0),
        ];
        assert_eq!(simplify(&points, 0.0), points);
    }

    #[test]
    fn test_closed_loop_keeps_far_point() {
        // First and last coincide; distance falls back to the point itself
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 0.0),
        ];
        let out = simplify(&points, 1.0);
        assert!(out.len() >= 3);
        assert_eq!(out[0], points[0]);
        assert_eq!(*out.last().unwrap(), points[3]);
    }
}
