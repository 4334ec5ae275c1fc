//! Affine transforms on stroke points.
//!
//! Matrices are written row-major in documents, `[a b c d e f g h i]`, and
//! map `(x, y)` to `(a*x + b*y + c, d*x + e*y + f)`. The bottom row takes
//! part in composition but not in point mapping.

use std::ops::Mul;

use glam::{DMat3, DVec2};

use crate::ast::{Point, Stroke};

/// A 3x3 transform matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    matrix: DMat3,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        matrix: DMat3::IDENTITY,
    };

    /// Build from nine entries in row-major order.
    pub fn from_rows(rows: [f64; 9]) -> Self {
        Self {
            matrix: DMat3::from_cols_array(&rows).transpose(),
        }
    }

    /// The nine entries in row-major order.
    pub fn rows(&self) -> [f64; 9] {
        self.matrix.transpose().to_cols_array()
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::from_rows([1.0, 0.0, dx, 0.0, 1.0, dy, 0.0, 0.0, 1.0])
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::from_rows([sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0])
    }

    /// Counter-clockwise rotation in radians, in a y-up frame.
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_rows([cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0])
    }

    /// `self` first, then `next`, as one transform.
    pub fn then(self, next: Affine) -> Affine {
        next * self
    }

    /// `self` applied `n` times. `pow(0)` is the identity.
    pub fn pow(self, n: usize) -> Affine {
        (0..n).fold(Affine::IDENTITY, |acc, _| acc * self)
    }

    /// Map a point, truncating toward zero. Pressure passes through.
    pub fn apply_point(&self, p: Point) -> Point {
        let mapped = self
            .matrix
            .transform_point2(DVec2::new(f64::from(p.x), f64::from(p.y)));
        Point::new(mapped.x as i32, mapped.y as i32, p.pressure)
    }

    /// A transformed copy of `stroke`, same diameter.
    pub fn apply_stroke(&self, stroke: &Stroke) -> Stroke {
        Stroke::new(
            stroke.diameter,
            stroke.points.iter().map(|&p| self.apply_point(p)).collect(),
        )
    }

    pub fn abs_diff_eq(&self, other: &Affine, max_abs_diff: f64) -> bool {
        self.matrix.abs_diff_eq(other.matrix, max_abs_diff)
    }
}

impl Default for Affine {
    fn default() -> Self {
        Affine::IDENTITY
    }
}

/// Standard matrix product: `(a * b)` applied to `p` is `a` applied to `b(p)`.
impl Mul for Affine {
    type Output = Affine;

    fn mul(self, rhs: Affine) -> Affine {
        Affine {
            matrix: self.matrix * rhs.matrix,
        }
    }
}
