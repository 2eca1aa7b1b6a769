//! Forward Euler integration with a floor clamp.

use crate::cloth::ClothState;

/// Height of the floor plane. Nothing ends a step below it.
pub const FLOOR_HEIGHT: f32 = 0.0;

/// Advance velocities and positions of all free points by `dt`.
///
/// Positions move with the velocity from *before* this step's update
/// (`x += dt * v_old`), which is plain forward Euler rather than
/// semi-implicit Euler. Afterwards every point, pinned or not, is clamped to
/// the floor.
pub fn integrate(cloth: &mut ClothState, dt: f32) {
    let dt_mass = dt / cloth.params.mass;
    let ClothState {
        positions,
        velocities,
        forces,
        pins,
        ..
    } = cloth;

    for i in 0..positions.len() {
        if !pins.contains(i) {
            let old_v = velocities[i];
            velocities[i] += forces[i] * dt_mass;
            positions[i] += dt * old_v;
        }
        if positions[i].y < FLOOR_HEIGHT {
            positions[i].y = FLOOR_HEIGHT;
        }
    }
}
