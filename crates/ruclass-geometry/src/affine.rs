//! 2D affine matrices and rectangles.
//!
//! [`Affine2D`] stores the six free entries of a 3×3 matrix with a trivial
//! bottom row. The `post_*` builders post-multiply, so operations apply to
//! points in the order they were composed: `translate` then `rotate` means
//! "move, then spin the moved point".

use serde::{Deserialize, Serialize};

/// `x' = sx*x + kx*y + tx`, `y' = ky*x + sy*y + ty`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine2D {
    pub sx: f32,
    pub kx: f32,
    pub tx: f32,
    pub ky: f32,
    pub sy: f32,
    pub ty: f32,
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Self = Self {
        sx: 1.0,
        kx: 0.0,
        tx: 0.0,
        ky: 0.0,
        sy: 1.0,
        ty: 0.0,
    };

    pub fn translate(dx: f32, dy: f32) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            sx,
            sy,
            ..Self::IDENTITY
        }
    }

    /// Rotation about the origin. Positive degrees turn +x towards +y,
    /// i.e. clockwise on a y-down raster.
    pub fn rotate(degrees: f32) -> Self {
        let (sin, cos) = sin_cos_degrees(degrees);
        Self {
            sx: cos,
            kx: -sin,
            tx: 0.0,
            ky: sin,
            sy: cos,
            ty: 0.0,
        }
    }

    /// `self` followed by `next`.
    pub fn post_concat(&mut self, next: &Affine2D) -> &mut Self {
        let s = *self;
        let o = next;
        *self = Self {
            sx: o.sx * s.sx + o.kx * s.ky,
            kx: o.sx * s.kx + o.kx * s.sy,
            tx: o.sx * s.tx + o.kx * s.ty + o.tx,
            ky: o.ky * s.sx + o.sy * s.ky,
            sy: o.ky * s.kx + o.sy * s.sy,
            ty: o.ky * s.tx + o.sy * s.ty + o.ty,
        };
        self
    }

    pub fn post_translate(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.post_concat(&Self::translate(dx, dy))
    }

    pub fn post_scale(&mut self, sx: f32, sy: f32) -> &mut Self {
        self.post_concat(&Self::scale(sx, sy))
    }

    pub fn post_rotate(&mut self, degrees: f32) -> &mut Self {
        self.post_concat(&Self::rotate(degrees))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    #[inline]
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.sx * x + self.kx * y + self.tx,
            self.ky * x + self.sy * y + self.ty,
        )
    }

    /// Bounding box of the four mapped corners.
    pub fn map_rect(&self, rect: &RectF) -> RectF {
        let corners = [
            self.map_point(rect.left, rect.top),
            self.map_point(rect.right, rect.top),
            self.map_point(rect.right, rect.bottom),
            self.map_point(rect.left, rect.bottom),
        ];
        let mut out = RectF::new(f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for (x, y) in corners {
            out.left = out.left.min(x);
            out.top = out.top.min(y);
            out.right = out.right.max(x);
            out.bottom = out.bottom.max(y);
        }
        out
    }

    pub fn determinant(&self) -> f32 {
        self.sx * self.sy - self.kx * self.ky
    }

    /// `None` if the matrix collapses the plane.
    pub fn invert(&self) -> Option<Affine2D> {
        let det = self.determinant() as f64;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let (sx, kx, tx) = (self.sx as f64, self.kx as f64, self.tx as f64);
        let (ky, sy, ty) = (self.ky as f64, self.sy as f64, self.ty as f64);

        Some(Affine2D {
            sx: (sy * inv) as f32,
            kx: (-kx * inv) as f32,
            tx: ((kx * ty - sy * tx) * inv) as f32,
            ky: (-ky * inv) as f32,
            sy: (sx * inv) as f32,
            ty: ((ky * tx - sx * ty) * inv) as f32,
        })
    }
}

/// Exact for quarter turns so 90° rotations don't leave 1e-8 skew behind.
fn sin_cos_degrees(degrees: f32) -> (f32, f32) {
    if degrees.rem_euclid(90.0) == 0.0 {
        match (degrees / 90.0).rem_euclid(4.0) as i32 {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        }
    } else {
        let (sin, cos) = (degrees as f64).to_radians().sin_cos();
        (sin as f32, cos as f32)
    }
}

/// Axis-aligned rectangle, edges in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// `(0, 0, width, height)`
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Inclusive containment with a little slack for rounding.
    pub fn contains_rect(&self, other: &RectF, epsilon: f32) -> bool {
        other.left >= self.left - epsilon
            && other.top >= self.top - epsilon
            && other.right <= self.right + epsilon
            && other.bottom <= self.bottom + epsilon
    }
}
