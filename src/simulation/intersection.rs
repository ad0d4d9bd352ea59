//! Earliest-time intersection of a moving point with a line segment.
//!
//! Every routine works in normalized sub-step time: the point travels
//! linearly from `p0` at `t = 0` to `p1` at `t = 1`, and a moving segment
//! interpolates its endpoints the same way. Only hits in `[0, 1)` count.
//! Comparisons are exact, there is no epsilon anywhere in here.

use std::fmt::Display;

use serde::Serialize;

use super::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Intersection {
    pub time: f64,
    pub point: Vector2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    NoDimension { start: Vector2, end: Vector2 },
    NonFinite,
    /// A shape's two poses disagree on vertex count or closure.
    PoseMismatch { before: usize, after: usize },
}

impl Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::NoDimension { start, end } => write!(
                f,
                "Line has no dimension ({}, {} to {}, {})",
                start.x, start.y, end.x, end.y
            ),
            GeometryError::NonFinite => write!(f, "Non-finite coordinate in collision input"),
            GeometryError::PoseMismatch { before, after } => write!(
                f,
                "Shape poses differ ({before} vertices before, {after} after)"
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Segment `(s0, e0)` at the start of the sub-step and `(s1, e1)` at its end.
///
/// Pass `s0 == s1` and `e0 == e1` for a segment that does not move.
pub fn detect_primitive(
    s0: Vector2,
    e0: Vector2,
    s1: Vector2,
    e1: Vector2,
    p0: Vector2,
    p1: Vector2,
) -> Result<Option<Intersection>, GeometryError> {
    if s0.equal(s1) && e0.equal(e1) {
        detect_line(s0, e0, p0, p1)
    } else {
        detect_moving_line(s0, e0, s1, e1, p0, p1)
    }
}

/// Static segment `ls -> le` against the point path `p0 -> p1`.
pub fn detect_line(
    ls: Vector2,
    le: Vector2,
    p0: Vector2,
    p1: Vector2,
) -> Result<Option<Intersection>, GeometryError> {
    ensure_finite(&[ls, le, p0, p1])?;

    // solve in one endpoint order so exact endpoint hits do not depend on it
    let (ls, le) = if (le.x, le.y) < (ls.x, ls.y) {
        (le, ls)
    } else {
        (ls, le)
    };

    if ls.equal(le) {
        // A zero-length segment has no direction to cross, only a point to sit on.
        if p0.equal(p1) {
            return Ok(p0.equal(ls).then_some(Intersection {
                time: 0.,
                point: p0,
            }));
        }
        return Err(GeometryError::NoDimension { start: ls, end: le });
    }

    if p0.equal(p1) {
        return Ok(on_segment(ls, le, p0).then_some(Intersection {
            time: 0.,
            point: p0,
        }));
    }

    if ls.x == le.x {
        return Ok(detect_vertical_line(ls, le, p0, p1));
    }

    if ls.y == le.y {
        return Ok(detect_horizontal_line(ls, le, p0, p1));
    }

    let g = ls.gradient(le);
    let numerator = ls.y - p0.y + g * (p0.x - ls.x);
    let denominator = p1.y - p0.y + g * (p0.x - p1.x);

    if denominator == 0. {
        if numerator != 0. {
            // parallel, not touching
            return Ok(None);
        }
        // travelling along the line itself
        return Ok(collinear_entry(ls.x, le.x, p0.x, p1.x).map(|t| Intersection {
            time: t,
            point: p0.lerp(p1, t),
        }));
    }

    let t = numerator / denominator;
    if !in_window(t) {
        return Ok(None);
    }

    let x = t * (p1.x - p0.x) + p0.x;
    if x < ls.x.min(le.x) || x > ls.x.max(le.x) {
        return Ok(None);
    }
    let y = t * (p1.y - p0.y) + p0.y;

    Ok(Some(Intersection {
        time: t,
        point: Vector2::new(x, y),
    }))
}

fn detect_vertical_line(
    ls: Vector2,
    le: Vector2,
    p0: Vector2,
    p1: Vector2,
) -> Option<Intersection> {
    let xs = ls.x;
    let dx = p1.x - p0.x;

    if dx == 0. {
        if p0.x != xs {
            return None;
        }
        let t = collinear_entry(ls.y, le.y, p0.y, p1.y)?;
        return Some(Intersection {
            time: t,
            point: Vector2::new(xs, t * (p1.y - p0.y) + p0.y),
        });
    }

    let t = (xs - p0.x) / dx;
    if !in_window(t) {
        return None;
    }

    let y = t * (p1.y - p0.y) + p0.y;
    if y < ls.y.min(le.y) || y > ls.y.max(le.y) {
        return None;
    }

    Some(Intersection {
        time: t,
        point: Vector2::new(xs, y),
    })
}

fn detect_horizontal_line(
    ls: Vector2,
    le: Vector2,
    p0: Vector2,
    p1: Vector2,
) -> Option<Intersection> {
    let ys = ls.y;
    let dy = p1.y - p0.y;

    if dy == 0. {
        if p0.y != ys {
            return None;
        }
        let t = collinear_entry(ls.x, le.x, p0.x, p1.x)?;
        return Some(Intersection {
            time: t,
            point: Vector2::new(t * (p1.x - p0.x) + p0.x, ys),
        });
    }

    let t = (ys - p0.y) / dy;
    if !in_window(t) {
        return None;
    }

    let x = t * (p1.x - p0.x) + p0.x;
    if x < ls.x.min(le.x) || x > ls.x.max(le.x) {
        return None;
    }

    Some(Intersection {
        time: t,
        point: Vector2::new(x, ys),
    })
}

/// Segment moving from `ls0 -> le0` to `ls1 -> le1` against the point path.
///
/// Requiring the point to lie on the line through the moving endpoints gives
/// `a t^2 + b t + c = 0`; each root in `[0, 1)` is then checked against the
/// segment's extent at that instant and the earliest survivor wins. When the
/// relative motion keeps the point on the line for the whole sub-step
/// (`a == b == c == 0`) the hit time is when it first enters the segment.
pub fn detect_moving_line(
    ls0: Vector2,
    le0: Vector2,
    ls1: Vector2,
    le1: Vector2,
    p0: Vector2,
    p1: Vector2,
) -> Result<Option<Intersection>, GeometryError> {
    ensure_finite(&[ls0, le0, ls1, le1, p0, p1])?;

    if ls0.equal(le0) {
        return Err(GeometryError::NoDimension {
            start: ls0,
            end: le0,
        });
    }
    if ls1.equal(le1) {
        return Err(GeometryError::NoDimension {
            start: ls1,
            end: le1,
        });
    }

    let sweep = Sweep::new(ls0, le0, ls1, le1, p0, p1);

    let a = sweep.dd.cross(sweep.dr);
    let b = sweep.d0.cross(sweep.dr) + sweep.dd.cross(sweep.r0);
    let c = sweep.d0.cross(sweep.r0);

    if a == 0. && b == 0. {
        if c != 0. {
            // relative path parallel to the segment, never on it
            return Ok(None);
        }
        return Ok(sweep.overlap_entry());
    }

    Ok(quadratic_roots(a, b, c)
        .into_iter()
        .filter(|t| in_window(*t))
        .find(|t| sweep.within_segment(*t))
        .map(|t| sweep.intersection(t)))
}

/// Relative-motion terms of a moving segment and a moving point.
struct Sweep {
    ls0: Vector2,
    ls1: Vector2,
    le0: Vector2,
    le1: Vector2,
    p0: Vector2,
    p1: Vector2,
    /// Segment direction at `t = 0` and its change over the sub-step.
    d0: Vector2,
    dd: Vector2,
    /// Point relative to the segment start at `t = 0` and its change.
    r0: Vector2,
    dr: Vector2,
}

impl Sweep {
    fn new(
        ls0: Vector2,
        le0: Vector2,
        ls1: Vector2,
        le1: Vector2,
        p0: Vector2,
        p1: Vector2,
    ) -> Self {
        let d0 = le0 - ls0;
        Self {
            ls0,
            ls1,
            le0,
            le1,
            p0,
            p1,
            d0,
            dd: (le1 - ls1) - d0,
            r0: p0 - ls0,
            dr: (p1 - p0) - (ls1 - ls0),
        }
    }

    fn intersection(&self, t: f64) -> Intersection {
        Intersection {
            time: t,
            point: self.p0.lerp(self.p1, t),
        }
    }

    fn within_segment(&self, t: f64) -> bool {
        let s = self.ls0.lerp(self.ls1, t);
        let e = self.le0.lerp(self.le1, t);
        let p = self.p0.lerp(self.p1, t);
        let d = e - s;
        let length_sq = d.dot(d);
        if length_sq == 0. {
            return false;
        }
        let along = (p - s).dot(d);
        along >= 0. && along <= length_sq
    }

    /// The point stays on the segment's line throughout; find when its
    /// projection first lands between the endpoints.
    ///
    /// `along(t) = r(t).d(t)` and `length_sq(t) = d(t).d(t)` are both
    /// quadratics, so the entry time is `t = 0` or a root of `along` or of
    /// `length_sq - along`.
    fn overlap_entry(&self) -> Option<Intersection> {
        let along = (
            self.dr.dot(self.dd),
            self.r0.dot(self.dd) + self.dr.dot(self.d0),
            self.r0.dot(self.d0),
        );
        let length_sq = (
            self.dd.dot(self.dd),
            2. * self.d0.dot(self.dd),
            self.d0.dot(self.d0),
        );
        let remaining = (
            length_sq.0 - along.0,
            length_sq.1 - along.1,
            length_sq.2 - along.2,
        );

        if self.within_segment(0.) {
            return Some(self.intersection(0.));
        }

        let eval = |(a, b, c): (f64, f64, f64), t: f64| (a * t + b) * t + c;

        let mut candidates: Vec<(f64, bool)> = quadratic_roots(along.0, along.1, along.2)
            .into_iter()
            .map(|t| (t, true))
            .chain(
                quadratic_roots(remaining.0, remaining.1, remaining.2)
                    .into_iter()
                    .map(|t| (t, false)),
            )
            .filter(|(t, _)| in_window(*t))
            .collect();
        candidates.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        candidates
            .into_iter()
            .find(|&(t, at_start)| {
                // the root's own bound is zero by construction, test the other one
                eval(length_sq, t) > 0.
                    && if at_start {
                        eval(remaining, t) >= 0.
                    } else {
                        eval(along, t) >= 0.
                    }
            })
            .map(|(t, _)| self.intersection(t))
    }
}

/// Real roots of `a t^2 + b t + c`, ascending. Falls back to the linear
/// solution when `a == 0`.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0. {
        if b == 0. {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let discriminant = b * b - 4. * a * c;
    if discriminant < 0. {
        return Vec::new();
    }

    let root = discriminant.sqrt();
    let ta = (-b - root) / (2. * a);
    let tb = (-b + root) / (2. * a);
    if ta <= tb {
        vec![ta, tb]
    } else {
        vec![tb, ta]
    }
}

/// Along one axis: a range `[a, b]` (either order) and a point moving from
/// `u0` to `u1`. When the point enters the range within the sub-step.
fn collinear_entry(a: f64, b: f64, u0: f64, u1: f64) -> Option<f64> {
    let (lo, hi) = (a.min(b), a.max(b));
    if u0 >= lo && u0 <= hi {
        return Some(0.);
    }
    if u1 == u0 {
        return None;
    }
    let target = if u0 < lo { lo } else { hi };
    let t = (target - u0) / (u1 - u0);
    in_window(t).then_some(t)
}

fn on_segment(ls: Vector2, le: Vector2, p: Vector2) -> bool {
    (le - ls).cross(p - ls) == 0.
        && p.x >= ls.x.min(le.x)
        && p.x <= ls.x.max(le.x)
        && p.y >= ls.y.min(le.y)
        && p.y <= ls.y.max(le.y)
}

fn in_window(t: f64) -> bool {
    (0. ..1.).contains(&t)
}

fn ensure_finite(points: &[Vector2]) -> Result<(), GeometryError> {
    if points.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(GeometryError::NonFinite)
    }
}


#[cfg(test)]
mod moving_line_tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vector2 {
        Vector2::new(x, y)
    }

    #[test]
    fn static_segment_goes_through_static_path() {
        let a = detect_primitive(v(1., 0.), v(1., 2.), v(1., 0.), v(1., 2.), v(0., 1.), v(2., 1.));
        let b = detect_line(v(1., 0.), v(1., 2.), v(0., 1.), v(2., 1.));
        assert_eq!(a, b);
    }

    #[test]
    fn rising_floor_hits_stationary_point() {
        let hit = detect_primitive(v(-1., 0.), v(1., 0.), v(-1., 2.), v(1., 2.), v(0., 1.), v(0., 1.))
            .unwrap()
            .unwrap();
        assert_eq!(hit.time, 0.5);
        assert_eq!(hit.point, v(0., 1.));
    }

    #[test]
    fn swinging_segment_sweeps_over_point() {
        let hit = detect_primitive(v(0., 0.), v(2., 0.), v(0., 0.), v(0., 2.), v(0.5, 0.5), v(0.5, 0.5))
            .unwrap()
            .unwrap();
        assert_eq!(hit.time, 0.5);
        assert_eq!(hit.point, v(0.5, 0.5));
    }

    #[test]
    fn earliest_of_two_roots() {
        // roots at t = 0.5 and t = 1, the latter is outside the window
        let hit = detect_primitive(v(0., 0.), v(2., 0.), v(0., 0.), v(0., 2.), v(2., 1.), v(0., 1.))
            .unwrap()
            .unwrap();
        assert_eq!(hit.time, 0.5);
        assert_eq!(hit.point, v(1., 1.));
    }

    #[test]
    fn root_outside_segment_is_rejected() {
        // the line sweeps past the point, but the segment is too short to reach it
        assert!(
            detect_primitive(v(-1., 0.), v(1., 0.), v(-1., 2.), v(1., 2.), v(5., 1.), v(5., 1.))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn parallel_relative_motion_misses() {
        // segment slides sideways, point sits above its line
        assert!(
            detect_primitive(v(0., 0.), v(1., 0.), v(2., 0.), v(3., 0.), v(1., 1.), v(1., 1.))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn sliding_along_own_line_reaches_point() {
        let hit = detect_primitive(v(0., 0.), v(1., 0.), v(2., 0.), v(3., 0.), v(2.5, 0.), v(2.5, 0.))
            .unwrap()
            .unwrap();
        assert_eq!(hit.time, 0.75);
        assert_eq!(hit.point, v(2.5, 0.));
    }

    #[test]
    fn sliding_along_own_line_already_covering_point() {
        let hit = detect_primitive(v(0., 0.), v(1., 0.), v(2., 0.), v(3., 0.), v(0.5, 0.), v(0.5, 0.))
            .unwrap()
            .unwrap();
        assert_eq!(hit.time, 0.);
    }

    #[test]
    fn sliding_along_own_line_never_reaching() {
        assert!(
            detect_primitive(v(0., 0.), v(1., 0.), v(2., 0.), v(3., 0.), v(9., 0.), v(9., 0.))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn collapsed_segment_is_an_error() {
        assert!(matches!(
            detect_primitive(v(0., 0.), v(1., 0.), v(2., 2.), v(2., 2.), v(0., 1.), v(0., -1.)),
            Err(GeometryError::NoDimension { .. })
        ));
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn coord() -> impl Strategy<Value = f64> {
        (-100i32..100).prop_map(|v| v as f64 * 0.5)
    }

    fn point() -> impl Strategy<Value = Vector2> {
        (coord(), coord()).prop_map(|(x, y)| Vector2::new(x, y))
    }

    proptest! {
        #[test]
        fn detection_is_pure(
            s0 in point(), e0 in point(), s1 in point(), e1 in point(),
            p0 in point(), p1 in point()
        ) {
            prop_assume!(!s0.equal(e0) && !s1.equal(e1));
            let first = detect_primitive(s0, e0, s1, e1, p0, p1);
            let second = detect_primitive(s0, e0, s1, e1, p0, p1);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn hits_stay_in_window(
            s0 in point(), e0 in point(), s1 in point(), e1 in point(),
            p0 in point(), p1 in point()
        ) {
            prop_assume!(!s0.equal(e0) && !s1.equal(e1));
            if let Ok(Some(hit)) = detect_primitive(s0, e0, s1, e1, p0, p1) {
                prop_assert!(hit.time >= 0. && hit.time < 1.);
            }
        }

        #[test]
        fn endpoint_order_does_not_matter(
            ls in point(), le in point(), p0 in point(), p1 in point()
        ) {
            prop_assume!(!ls.equal(le));
            let forward = detect_line(ls, le, p0, p1).unwrap();
            let backward = detect_line(le, ls, p0, p1).unwrap();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn parallel_offset_path_never_hits(
            ls in point(), le in point(),
            t0 in -4i32..4, t1 in -4i32..4,
            offset in 1i32..10
        ) {
            prop_assume!(!ls.equal(le));
            let direction = le - ls;
            let normal = Vector2::new(-direction.y, direction.x);
            let shift = normal.scale(offset as f64);
            let p0 = ls + direction.scale(t0 as f64) + shift;
            let p1 = ls + direction.scale(t1 as f64) + shift;
            prop_assert_eq!(detect_line(ls, le, p0, p1).unwrap(), None);
        }
    }
}
