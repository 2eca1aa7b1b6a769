//! Per-step force accumulation: gravity, velocity damping and damped springs.

use crate::cloth::ClothState;

/// Springs shorter than this are skipped; their direction is undefined.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Overwrite the force array with this step's net force per point.
///
/// Free points start from `gravity + damping * v`, pinned points from zero.
/// Each spring then pushes `p1` along `p1 - p2` and `p2` the opposite way,
/// skipping whichever endpoints are pinned.
pub fn accumulate(cloth: &mut ClothState) {
    let params = cloth.params;
    let ClothState {
        positions,
        velocities,
        forces,
        springs,
        pins,
        ..
    } = cloth;

    for (i, (f, v)) in forces.iter_mut().zip(velocities.iter()).enumerate() {
        *f = if pins.contains(i) {
            glam::Vec3::ZERO
        } else {
            params.gravity + params.damping * *v
        };
    }

    for s in springs.iter() {
        let delta_p = positions[s.p1] - positions[s.p2];
        let delta_v = velocities[s.p1] - velocities[s.p2];
        let dist = delta_p.length();
        if dist <= DEGENERATE_EPSILON {
            continue;
        }

        let left = -s.ks * (dist - s.rest_length());
        let right = s.kd * (delta_v.dot(delta_p) / dist);
        let spring_force = (left + right) * (delta_p / dist);

        if !pins.contains(s.p1) {
            forces[s.p1] += spring_force;
        }
        if !pins.contains(s.p2) {
            forces[s.p2] -= spring_force;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloth::PointParams;
    use crate::pins::PinSet;
    use crate::spring::{Spring, SpringConstants, SpringKind};
    use glam::Vec3;

    fn two_points(pinned: &[usize], ks: f32, kd: f32) -> ClothState {
        let positions = vec![Vec3::ZERO, Vec3::X];
        let springs = vec![Spring::between(
            &positions,
            0,
            1,
            SpringConstants::new(ks, kd),
            SpringKind::Structural,
        )];
        ClothState::from_parts(
            positions,
            springs,
            PinSet::from_indices(2, pinned.iter().copied()),
            Vec::new(),
            PointParams {
                gravity: Vec3::new(0.0, -1.0, 0.0),
                damping: -0.5,
                mass: 1.0,
            },
        )
    }

    #[test]
    fn test_gravity_and_damping() {
        let mut cloth = two_points(&[], 0.0, 0.0);
        cloth.velocities[1] = Vec3::new(0.0, 2.0, 0.0);
        accumulate(&mut cloth);
        assert_eq!(cloth.forces[0], Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(cloth.forces[1], Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn test_stretched_spring_pulls_together() {
        let mut cloth = two_points(&[], 1.0, 0.0);
        cloth.params.gravity = Vec3::ZERO;
        cloth.positions[1] = Vec3::new(2.0, 0.0, 0.0);
        accumulate(&mut cloth);
        // p1 - p2 points along -x, magnitude -ks * (2 - 1) = -1
        assert_eq!(cloth.forces[0], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(cloth.forces[1], Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_spring_damping_term() {
        let mut cloth = two_points(&[], 0.0, -1.0);
        cloth.params.gravity = Vec3::ZERO;
        cloth.params.damping = 0.0;
        // separating at unit speed along the spring
        cloth.velocities[1] = Vec3::X;
        accumulate(&mut cloth);
        // dv . dp / d = (-1,0,0).(-1,0,0) / 1 = 1, times kd = -1, along (-1,0,0)
        assert_eq!(cloth.forces[0], Vec3::X);
        assert_eq!(cloth.forces[1], -Vec3::X);
    }

    #[test]
    fn test_pinned_endpoint_gets_nothing() {
        let mut cloth = two_points(&[0], 1.0, 0.0);
        cloth.positions[1] = Vec3::new(2.0, 0.0, 0.0);
        accumulate(&mut cloth);
        assert_eq!(cloth.forces[0], Vec3::ZERO);
        assert_eq!(cloth.forces[1], Vec3::new(-1.0, -1.0, 0.0));
    }

    #[test]
    fn test_zero_length_spring_skipped() {
        let mut cloth = two_points(&[], 1.0, -0.25);
        cloth.positions[1] = cloth.positions[0];
        accumulate(&mut cloth);
        assert!(cloth.forces.iter().all(|f| f.is_finite()));
        assert_eq!(cloth.forces[1], Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_overwrites_previous_forces() {
        let mut cloth = two_points(&[], 0.0, 0.0);
        cloth.forces[1] = Vec3::splat(100.0);
        accumulate(&mut cloth);
        assert_eq!(cloth.forces[1], Vec3::new(0.0, -1.0, 0.0));
    }
}
