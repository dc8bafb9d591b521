use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

#[inline(always)]
pub fn pi(v: f64) -> f64 {
    PI * v
}

/// Clamps `x` to the unit interval.
///
/// NaN passes through unchanged.
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// A point in spiral space. The spiral's logical origin is `(0, 0)`.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Distance from the origin.
    pub fn radius(&self) -> f64 {
        dist(*self, Point::ORIGIN)
    }

    /// Angle from the positive x axis, in `(-pi, pi]`.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

pub fn polar(radius: f64, angle: f64) -> Point {
    Point {
        x: radius * angle.cos(),
        y: radius * angle.sin(),
    }
}

pub fn dist(a: Point, b: Point) -> f64 {
    f64::hypot(a.x - b.x, a.y - b.y)
}

/// Recovers a continuous angle for each point, undoing the `2*pi` wraparound of `atan2`.
///
/// Assumes consecutive points are less than `pi` radians apart as seen from the origin.
pub fn unwrap_angles(points: &[Point]) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    for p in points {
        let raw = p.angle();
        if let Some(prev) = prev {
            let delta = raw - prev;
            if delta < -pi(1.0) {
                offset += pi(2.0);
            } else if delta > pi(1.0) {
                offset -= pi(2.0);
            }
        }
        prev = Some(raw);
        out.push(raw + offset);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pi() {
        assert_eq!(pi(0.0), 0.0);
        assert_eq!(pi(1.0), PI);
        assert_eq!(pi(-3.7), -3.7 * PI);
        assert!(pi(f64::NAN).is_nan());
    }

    #[test]
    fn test_clamp01() {
        const TEST_CASES: &[(f64, f64)] = &[
            (-1.0, 0.0),
            (0.0, 0.0),
            (0.25, 0.25),
            (1.0, 1.0),
            (17.0, 1.0),
        ];
        for &(x, want) in TEST_CASES {
            let got = clamp01(x);
            if got != want {
                panic!("clamp01({}): got {}, want {}", x, got, want);
            }
        }
        assert!(clamp01(f64::NAN).is_nan());
    }

    #[test]
    fn test_polar() {
        let p = polar(2.0, 0.0);
        assert_eq!(p, Point::new(2.0, 0.0));

        let p = polar(3.0, pi(0.5));
        assert!(p.x.abs() < 1e-12, "x should vanish, got {}", p.x);
        assert!((p.y - 3.0).abs() < 1e-12, "y should be 3, got {}", p.y);

        let p = polar(5.0, 1.234);
        assert!((p.radius() - 5.0).abs() < 1e-12);
        assert!((p.angle() - 1.234).abs() < 1e-12);
    }

    #[test]
    fn test_dist() {
        assert_eq!(dist(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_eq!(dist(Point::new(10.0, 20.0), Point::new(15.0, 32.0)), 13.0);
    }

    #[test]
    fn test_unwrap_angles() {
        let points: Vec<Point> = (0..40).map(|i| polar(1.0, 0.3 * i as f64)).collect();
        let angles = unwrap_angles(&points);
        for (i, a) in angles.iter().enumerate() {
            let want = 0.3 * i as f64;
            if (a - want).abs() > 1e-9 {
                panic!("angle {}: got {}, want {}", i, a, want);
            }
        }
    }
}
