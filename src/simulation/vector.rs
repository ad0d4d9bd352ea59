use std::ops::{Add, Mul, Neg, Sub};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0., y: 0. };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, w: Vector2) -> Vector2 {
        Vector2 {
            x: self.x + w.x,
            y: self.y + w.y,
        }
    }

    pub fn subtract(self, w: Vector2) -> Vector2 {
        Vector2 {
            x: self.x - w.x,
            y: self.y - w.y,
        }
    }

    pub fn scale(self, k: f64) -> Vector2 {
        Vector2 {
            x: self.x * k,
            y: self.y * k,
        }
    }

    /// Exact component equality, no epsilon.
    pub fn equal(self, w: Vector2) -> bool {
        self.x == w.x && self.y == w.y
    }

    /// Slope of the line from `self` to `w`.
    ///
    /// Vertical lines always report `+inf`, whichever way they are traversed.
    pub fn gradient(self, w: Vector2) -> f64 {
        let g = (w.y - self.y) / (w.x - self.x);
        if g == f64::NEG_INFINITY {
            f64::INFINITY
        } else {
            g
        }
    }

    pub fn cross(self, w: Vector2) -> f64 {
        self.x * w.y - self.y * w.x
    }

    pub fn dot(self, w: Vector2) -> f64 {
        self.x * w.x + self.y * w.y
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Linear interpolation, `t = 0` gives `self`, `t = 1` gives `w`.
    pub fn lerp(self, w: Vector2, t: f64) -> Vector2 {
        self.add(w.subtract(self).scale(t))
    }

    pub fn rotate(self, angle: f64) -> Vector2 {
        let (sin, cos) = angle.sin_cos();
        Vector2 {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, w: Vector2) -> Vector2 {
        Vector2::add(self, w)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, w: Vector2) -> Vector2 {
        self.subtract(w)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, k: f64) -> Vector2 {
        self.scale(k)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        self.scale(-1.)
    }
}
