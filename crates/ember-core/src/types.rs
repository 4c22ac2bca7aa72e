//! Spatial and common types

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Threshold below which a scalar is treated as zero by the simulation
pub const FLOAT_EPSILON: f32 = 0.0001;

/// Returns true when `value` is within [`FLOAT_EPSILON`] of zero
pub fn is_zero(value: f32) -> bool {
    value.abs() < FLOAT_EPSILON
}

/// Wraps an angle in degrees with C `fmod` semantics (the sign of the input is kept)
pub fn fmod_degrees(angle: f32) -> f32 {
    angle % 360.0
}

/// A rigid 2D transform: translation followed by a rotation in radians
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise
    pub angle: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        angle: 0.0,
    };

    pub const fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Rotation as a unit vector `(cos, sin)`
    pub fn rotation(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Rotation in degrees
    pub fn angle_degrees(&self) -> f32 {
        self.angle.to_degrees()
    }

    /// Transform a local point into the parent space
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.rotation().rotate(local) + self.position
    }
}

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Transform a local box (four corners) into an oriented bounding box
pub fn calculate_oobb(local: &[Vec2; 4], xf: &Transform2D) -> [Vec2; 4] {
    [
        xf.apply(local[0]),
        xf.apply(local[1]),
        xf.apply(local[2]),
        xf.apply(local[3]),
    ]
}
