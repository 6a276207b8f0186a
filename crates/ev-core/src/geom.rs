//! Planar vector and axis-aligned rectangle types.
//!
//! World coordinates are single-precision floats in abstract "world units"
//! (one obstacle-map cell is `scale` units wide).  `f32` is plenty for a
//! building-scale world and halves the memory of the SoA position arrays.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// A 2-D point or displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians, counter-clockwise from +x).
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3-D cross product.
    #[inline]
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn distance_sq(self, other: Vec2) -> f32 {
        (self - other).length_sq()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// Unit vector in the same direction, or `Vec2::ZERO` for (near-)zero input.
    pub fn normalize_or_zero(self) -> Vec2 {
        let len = self.length();
        if len > 1e-6 && len.is_finite() {
            self / len
        } else {
            Vec2::ZERO
        }
    }

    /// Heading angle in radians (`atan2(y, x)`).
    #[inline]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Rotate counter-clockwise by `angle` radians.
    pub fn rotate(self, angle: f32) -> Vec2 {
        let (s, c) = angle.sin_cos();
        Vec2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Scale down to `max` length if longer; shorter vectors are unchanged.
    pub fn clamp_length(self, max: f32) -> Vec2 {
        let len_sq = self.length_sq();
        if len_sq > max * max && len_sq > 0.0 {
            self * (max / len_sq.sqrt())
        } else {
            self
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f32> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ── Rect ──────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle `[min.x, max.x] × [min.y, max.y]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Build from any two opposite corners (order-insensitive).
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// `x, y, width, height` form, as used by the obstacle-map loader.
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    /// Square of half-size `half` centred on `center`.
    pub fn around(center: Vec2, half: f32) -> Self {
        Self {
            min: Vec2::new(center.x - half, center.y - half),
            max: Vec2::new(center.x + half, center.y + half),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    /// Closed containment (boundary counts as inside).
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Open containment (strict interior only).
    #[inline]
    pub fn contains_strict(&self, p: Vec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// Point of the rectangle closest to `p` (clamped x/y).  Equals `p` when
    /// `p` is inside.
    #[inline]
    pub fn nearest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.min.x, self.max.x), p.y.clamp(self.min.y, self.max.y))
    }

    /// Squared distance from `p` to the rectangle (0 inside).
    #[inline]
    pub fn distance_sq_to(&self, p: Vec2) -> f32 {
        p.distance_sq(self.nearest_point(p))
    }

    /// `true` if the interiors overlap (touching edges do not count).
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// `true` if the disk (`center`, `radius`) overlaps the rectangle.
    #[inline]
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        self.distance_sq_to(center) < radius * radius
    }

    /// Grow by `margin` on every side (negative shrinks).
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect {
            min: Vec2::new(self.min.x - margin, self.min.y - margin),
            max: Vec2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Clamp `p` into the rectangle shrunk by `inset` (used to keep an
    /// agent's disk inside world bounds).
    pub fn clamp_inside(&self, p: Vec2, inset: f32) -> Vec2 {
        let inset_x = inset.min(self.width() * 0.5);
        let inset_y = inset.min(self.height() * 0.5);
        Vec2::new(
            p.x.clamp(self.min.x + inset_x, self.max.x - inset_x),
            p.y.clamp(self.min.y + inset_y, self.max.y - inset_y),
        )
    }

    /// The four edges as `(start, end)` pairs: bottom, right, top, left.
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let a = self.min;
        let b = Vec2::new(self.max.x, self.min.y);
        let c = self.max;
        let d = Vec2::new(self.min.x, self.max.y);
        [(a, b), (b, c), (c, d), (d, a)]
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {}]", self.min, self.max)
    }
}
