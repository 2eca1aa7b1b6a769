//! Provot dynamic inverse: post-integration velocity correction that keeps
//! springs from stretching beyond their rest length.
//!
//! This is a single ordered pass over the spring list, not a constraint
//! solve. Corrections from earlier springs are visible to later ones through
//! the velocity array, so spring order changes the result.

use crate::cloth::ClothState;

/// Correct velocities of every over-stretched spring.
///
/// For a spring longer than its rest length, half the excess, pointed along
/// `p1 - p2`, is removed from `p1`'s velocity and added to `p2`'s. If one
/// endpoint is pinned the free endpoint receives the whole half-excess
/// instead. Springs with both endpoints pinned are left alone.
pub fn correct(cloth: &mut ClothState) {
    let ClothState {
        positions,
        velocities,
        springs,
        pins,
        ..
    } = cloth;

    for s in springs.iter() {
        let delta_p = positions[s.p1] - positions[s.p2];
        let dist = delta_p.length();
        let rest = s.rest_length();
        if dist <= rest {
            continue;
        }

        let correction = delta_p / dist * ((dist - rest) / 2.0);

        match (pins.contains(s.p1), pins.contains(s.p2)) {
            (true, false) => velocities[s.p2] += correction,
            (false, true) => velocities[s.p1] -= correction,
            (false, false) => {
                velocities[s.p1] -= correction;
                velocities[s.p2] += correction;
            }
            (true, true) => {}
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

    fn pair(pinned: &[usize]) -> ClothState {
        let positions = vec![Vec3::ZERO, Vec3::X];
        let springs = vec![Spring::between(
            &positions,
            0,
            1,
            SpringConstants::new(1.0, 0.0),
            SpringKind::Structural,
        )];
        ClothState::from_parts(
            positions,
            springs,
            PinSet::from_indices(2, pinned.iter().copied()),
            Vec::new(),
            PointParams {
                gravity: Vec3::ZERO,
                damping: 0.0,
                mass: 1.0,
            },
        )
    }

    #[test]
    fn test_not_stretched_is_noop() {
        let mut cloth = pair(&[]);
        cloth.velocities[0] = Vec3::new(0.3, 0.1, 0.0);
        cloth.positions[1] = Vec3::new(0.5, 0.0, 0.0);
        let before = cloth.velocities.clone();
        correct(&mut cloth);
        assert_eq!(cloth.velocities, before);
    }

    #[test]
    fn test_split_between_free_endpoints() {
        let mut cloth = pair(&[]);
        cloth.positions[1] = Vec3::new(3.0, 0.0, 0.0);
        correct(&mut cloth);
        // excess 2, half is 1, delta_p direction is -x
        assert_eq!(cloth.velocities[0], Vec3::X);
        assert_eq!(cloth.velocities[1], -Vec3::X);
    }

    #[test]
    fn test_p1_pinned_moves_p2_only() {
        let mut cloth = pair(&[0]);
        cloth.positions[1] = Vec3::new(3.0, 0.0, 0.0);
        correct(&mut cloth);
        assert_eq!(cloth.velocities[0], Vec3::ZERO);
        assert_eq!(cloth.velocities[1], -Vec3::X);
    }

    #[test]
    fn test_p2_pinned_moves_p1_only() {
        let mut cloth = pair(&[1]);
        cloth.positions[1] = Vec3::new(3.0, 0.0, 0.0);
        correct(&mut cloth);
        assert_eq!(cloth.velocities[0], Vec3::X);
        assert_eq!(cloth.velocities[1], Vec3::ZERO);
    }

    #[test]
    fn test_both_pinned_untouched() {
        let mut cloth = pair(&[0, 1]);
        cloth.positions[1] = Vec3::new(3.0, 0.0, 0.0);
        correct(&mut cloth);
        assert_eq!(cloth.velocities, vec![Vec3::ZERO, Vec3::ZERO]);
    }
}
