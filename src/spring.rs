//! Springs connecting pairs of mass points.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which deformation mode a spring resists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpringKind {
    /// Horizontal or vertical neighbors.
    Structural,
    /// Diagonal neighbors within a cell.
    Shear,
    /// Points two grid steps apart along a row or column.
    Bend,
}

/// Stiffness and damping for one spring kind.
///
/// Damping is applied as `kd * (dv . dp) / |dp|`, so a negative `kd`
/// opposes relative motion along the spring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConstants {
    pub ks: f32,
    pub kd: f32,
}

impl SpringConstants {
    pub const fn new(ks: f32, kd: f32) -> Self {
        Self { ks, kd }
    }
}

/// A damped spring between points `p1` and `p2`.
///
/// The rest length is measured once from the initial positions and never
/// recomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub p1: usize,
    pub p2: usize,
    rest_length: f32,
    pub ks: f32,
    pub kd: f32,
    pub kind: SpringKind,
}

impl Spring {
    /// Create a spring whose rest length is the current distance between
    /// `positions[p1]` and `positions[p2]`.
    pub fn between(
        positions: &[Vec3],
        p1: usize,
        p2: usize,
        constants: SpringConstants,
        kind: SpringKind,
    ) -> Self {
        assert_ne!(p1, p2, "spring endpoints must differ");
        let rest_length = positions[p1].distance(positions[p2]);
        Self {
            p1,
            p2,
            rest_length,
            ks: constants.ks,
            kd: constants.kd,
            kind,
        }
    }

    #[inline]
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Current length given the live position array.
    #[inline]
    pub fn length(&self, positions: &[Vec3]) -> f32 {
        positions[self.p1].distance(positions[self.p2])
    }

    /// Ratio of current length to rest length.
    pub fn stretch(&self, positions: &[Vec3]) -> f32 {
        self.length(positions) / self.rest_length
    }
}
