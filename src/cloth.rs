//! The cloth state aggregate and the physics step.

use glam::Vec3;

use crate::pins::PinSet;
use crate::spring::Spring;
use crate::{forces, integrator, provot};

/// Per-point physical constants shared by every point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointParams {
    pub gravity: Vec3,
    /// Added to the force as `damping * velocity`.
    pub damping: f32,
    pub mass: f32,
}

/// Everything the physics step reads and writes.
///
/// Positions, velocities and forces are parallel arrays: index `i` refers
/// to the same mass point in all three and they always have equal length.
#[derive(Debug, Clone)]
pub struct ClothState {
    pub(crate) positions: Vec<Vec3>,
    pub(crate) velocities: Vec<Vec3>,
    pub(crate) forces: Vec<Vec3>,
    rest_positions: Vec<Vec3>,
    pub(crate) springs: Vec<Spring>,
    pub(crate) pins: PinSet,
    triangles: Vec<[u32; 3]>,
    pub(crate) params: PointParams,
}

impl ClothState {
    /// Assemble a state from prebuilt parts. Velocities and forces start at zero.
    ///
    /// # Panics
    ///
    /// Panics if the pin set was built for a different point count or a spring
    /// references a point out of range.
    pub fn from_parts(
        positions: Vec<Vec3>,
        springs: Vec<Spring>,
        pins: PinSet,
        triangles: Vec<[u32; 3]>,
        params: PointParams,
    ) -> Self {
        let n = positions.len();
        assert_eq!(pins.point_count(), n, "pin set sized for a different cloth");
        assert!(
            springs.iter().all(|s| s.p1 < n && s.p2 < n),
            "spring endpoint out of range"
        );
        Self {
            velocities: vec![Vec3::ZERO; n],
            forces: vec![Vec3::ZERO; n],
            rest_positions: positions.clone(),
            positions,
            springs,
            pins,
            triangles,
            params,
        }
    }

    /// Advance one fixed step: accumulate forces, integrate, then apply the
    /// Provot correction.
    pub fn step(&mut self, dt: f32) {
        debug_assert_eq!(self.positions.len(), self.velocities.len());
        debug_assert_eq!(self.positions.len(), self.forces.len());

        forces::accumulate(self);
        integrator::integrate(self, dt);
        provot::correct(self);
        self.repair_non_finite();
    }

    /// Zero out any velocity and restore any position that went non-finite.
    ///
    /// Returns the number of points touched.
    fn repair_non_finite(&mut self) -> usize {
        let mut repaired = 0;
        for i in 0..self.positions.len() {
            let mut bad = false;
            if !self.velocities[i].is_finite() {
                self.velocities[i] = Vec3::ZERO;
                bad = true;
            }
            if !self.positions[i].is_finite() {
                self.positions[i] = self.rest_positions[i];
                bad = true;
            }
            repaired += bad as usize;
        }
        if repaired > 0 {
            log::warn!("Repaired {} non-finite cloth points", repaired);
        }
        repaired
    }

    /// Restore construction placement and zero all motion.
    pub fn reset(&mut self) {
        self.positions.copy_from_slice(&self.rest_positions);
        self.velocities.fill(Vec3::ZERO);
        self.forces.fill(Vec3::ZERO);
    }

    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn forces(&self) -> &[Vec3] {
        &self.forces
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn params(&self) -> &PointParams {
        &self.params
    }

    /// Placement the cloth was built with.
    pub fn rest_positions(&self) -> &[Vec3] {
        &self.rest_positions
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.pins.contains(index)
    }

    /// Move a point directly. Used by interaction; physics never calls this.
    pub fn set_position(&mut self, index: usize, position: Vec3) {
        self.positions[index] = position;
    }

    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        self.velocities[index] = velocity;
    }

    /// Triangle list resolved against the current positions.
    pub fn triangle_vertices(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.triangles.iter().map(move |t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Whether every position and velocity is finite.
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|p| p.is_finite()) && self.velocities.iter().all(|v| v.is_finite())
    }
}
