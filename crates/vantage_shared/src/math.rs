//! Mathematical types shared between data sources, the viewer and hosts.
//!
//! World coordinates are double precision: geocentric positions are in the
//! millions of meters and `f32` loses sub-meter detail there.

use serde::{Deserialize, Serialize};

/// 3D Vector - position, direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Linear interpolation toward `other` by `t` in [0, 1].
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    /// True when every component is finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Bounding sphere used to frame the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// Sphere center in world coordinates
    pub center: Vec3,
    /// Sphere radius (meters)
    pub radius: f64,
}

impl BoundingSphere {
    /// Creates a new bounding sphere
    #[must_use]
    pub const fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// A zero-radius sphere at `point`.
    #[must_use]
    pub const fn from_point(point: Vec3) -> Self {
        Self::new(point, 0.0)
    }

    /// True when the center is finite and the radius is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius >= 0.0
    }

    /// True when `other` lies entirely inside this sphere.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius
    }

    /// Smallest sphere enclosing both spheres.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.contains(other) {
            return *self;
        }
        if other.contains(self) {
            return *other;
        }

        // Neither contains the other, so the centers are distinct.
        let distance = self.center.distance(other.center);
        let radius = (distance + self.radius + other.radius) * 0.5;
        let direction = (other.center - self.center) * (1.0 / distance);
        Self::new(self.center + direction * (radius - self.radius), radius)
    }

    /// Sphere enclosing every sphere in `spheres`, `None` when empty.
    #[must_use]
    pub fn from_bounding_spheres(spheres: &[Self]) -> Option<Self> {
        let (first, rest) = spheres.split_first()?;
        Some(rest.iter().fold(*first, |acc, sphere| acc.union(sphere)))
    }
}

/// Camera offset relative to a target, in the target's local frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingPitchRange {
    /// Heading (radians, clockwise from north)
    pub heading: f64,
    /// Pitch (radians, negative looks down)
    pub pitch: f64,
    /// Distance from the target center (meters)
    pub range: f64,
}

impl HeadingPitchRange {
    /// Creates a new offset
    #[must_use]
    pub const fn new(heading: f64, pitch: f64, range: f64) -> Self {
        Self { heading, pitch, range }
    }

    /// True when every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.heading.is_finite() && self.pitch.is_finite() && self.range.is_finite()
    }
}

/// Column-major 4x4 matrix - camera reference transforms
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix4 {
    /// Elements in column-major order
    pub cols: [[f64; 4]; 4],
}

impl Matrix4 {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Pure translation to `position`.
    #[must_use]
    pub const fn from_translation(position: Vec3) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [position.x, position.y, position.z, 1.0],
            ],
        }
    }

    /// Translation component of this transform.
    #[must_use]
    pub const fn translation(&self) -> Vec3 {
        Vec3::new(self.cols[3][0], self.cols[3][1], self.cols[3][2])
    }

    /// True for the identity transform.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}
