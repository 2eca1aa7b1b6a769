//! Mouse interaction: picking a mass point, dragging it, or steering the
//! camera when nothing is picked.
//!
//! Point dragging and camera control share one input stream. Whether a drag
//! moves a point or the camera depends only on whether a point is selected.

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::cloth::ClothState;
use crate::input::MouseButton;

/// Pixels of drag per unit of point motion at unit camera distance.
const DRAG_PIXELS_PER_UNIT: f32 = 1500.0;

/// What a drag does while no point is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraDrag {
    /// Middle button: dolly in and out.
    Zoom,
    /// Any other button: rotate.
    Orbit,
}

/// Index of the first point within `radius` of `target`, scanning in index
/// order.
///
/// This is the first match, not the nearest one: when several points are in
/// range the lowest index wins.
pub fn pick_point(positions: &[Vec3], target: Vec3, radius: f32) -> Option<usize> {
    positions.iter().position(|p| p.distance(target) < radius)
}

/// Selection and drag state.
#[derive(Debug, Clone)]
pub struct Interaction {
    selected: Option<usize>,
    camera_drag: CameraDrag,
    last_cursor: Vec2,
    pick_radius: f32,
}

impl Interaction {
    pub fn new(pick_radius: f32) -> Self {
        Self {
            selected: None,
            camera_drag: CameraDrag::Orbit,
            last_cursor: Vec2::ZERO,
            pick_radius,
        }
    }

    /// Currently selected point.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn camera_drag(&self) -> CameraDrag {
        self.camera_drag
    }

    pub fn pick_radius(&self) -> f32 {
        self.pick_radius
    }

    /// A button went down at `cursor`. The caller follows up with
    /// [`select_at`](Self::select_at) once it knows the world point under the
    /// cursor.
    pub fn press(&mut self, button: MouseButton, cursor: Vec2) {
        self.last_cursor = cursor;
        self.camera_drag = match button {
            MouseButton::Middle => CameraDrag::Zoom,
            _ => CameraDrag::Orbit,
        };
    }

    /// Select the first point within the pick radius of `world_point`.
    ///
    /// Leaves the current selection alone when nothing is in range.
    pub fn select_at(&mut self, cloth: &ClothState, world_point: Vec3) -> Option<usize> {
        let hit = pick_point(cloth.positions(), world_point, self.pick_radius);
        if let Some(index) = hit {
            log::debug!("Selected point {} at {}", index, cloth.positions()[index]);
            self.selected = Some(index);
        }
        hit
    }

    /// Cursor moved to `cursor` with a button held.
    ///
    /// With a selection, the point is moved along the camera's right and up
    /// axes, scaled by camera distance, and its velocity is zeroed. Vertical
    /// motion that would put it at or below the floor is dropped for this
    /// event. Without a selection the camera orbits or zooms.
    pub fn drag(&mut self, cursor: Vec2, cloth: &mut ClothState, camera: &mut Camera) {
        let delta = cursor - self.last_cursor;
        self.last_cursor = cursor;

        match self.selected {
            Some(index) => {
                let scale = camera.distance.abs() / DRAG_PIXELS_PER_UNIT;
                let val_x = delta.x * scale;
                let val_y = -delta.y * scale;
                let right = camera.right();
                let up = Vec3::Y;

                let mut p = cloth.positions()[index];
                p.x += right.x * val_x + up.x * val_y;
                let new_y = p.y + up.y * val_y;
                if new_y > 0.0 {
                    p.y = new_y;
                }
                p.z += right.z * val_x + up.z * val_y;

                cloth.set_velocity(index, Vec3::ZERO);
                cloth.set_position(index, p);
            }
            None => match self.camera_drag {
                CameraDrag::Zoom => camera.zoom(delta.y),
                CameraDrag::Orbit => camera.orbit(delta),
            },
        }
    }

    /// Button released: drop the selection.
    pub fn release(&mut self) {
        if let Some(index) = self.selected.take() {
            log::debug!("Released point {}", index);
        }
    }

    /// Zero the held point's velocity so the next forward Euler step leaves
    /// its position alone.
    pub fn hold_selected(&self, cloth: &mut ClothState) {
        if let Some(index) = self.selected {
            cloth.set_velocity(index, Vec3::ZERO);
        }
    }

    /// Every point with a flag marking the selected one.
    pub fn point_markers<'a>(&self, cloth: &'a ClothState) -> impl Iterator<Item = (Vec3, bool)> + 'a {
        let selected = self.selected;
        cloth
            .positions()
            .iter()
            .enumerate()
            .map(move |(i, p)| (*p, selected == Some(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClothConfig;
    use crate::network;

    fn small_cloth() -> ClothState {
        network::build(&ClothConfig::new().with_grid(2, 2)).unwrap()
    }

    #[test]
    fn test_pick_first_not_nearest() {
        let positions = [
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.08, 0.0, 0.0),
            Vec3::new(0.01, 0.0, 0.0),
        ];
        assert_eq!(pick_point(&positions, Vec3::ZERO, 0.1), Some(1));
    }

    #[test]
    fn test_pick_miss() {
        let positions = [Vec3::ONE];
        assert_eq!(pick_point(&positions, Vec3::ZERO, 0.1), None);
    }

    #[test]
    fn test_middle_button_zooms() {
        let mut cloth = small_cloth();
        let mut camera = Camera::new();
        let mut ui = Interaction::new(0.1);
        ui.press(MouseButton::Middle, Vec2::ZERO);
        assert_eq!(ui.camera_drag(), CameraDrag::Zoom);
        ui.drag(Vec2::new(0.0, 30.0), &mut cloth, &mut camera);
        assert!((camera.distance - 22.5).abs() < 1e-4);
    }

    #[test]
    fn test_left_drag_orbits_without_selection() {
        let mut cloth = small_cloth();
        let before = cloth.positions().to_vec();
        let mut camera = Camera::new();
        let mut ui = Interaction::new(0.1);
        ui.press(MouseButton::Left, Vec2::ZERO);
        ui.drag(Vec2::new(50.0, 0.0), &mut cloth, &mut camera);
        assert!((camera.yaw - 10f32.to_radians()).abs() < 1e-6);
        assert_eq!(cloth.positions(), &before[..]);
    }

    #[test]
    fn test_drag_moves_selected_point() {
        let mut cloth = small_cloth();
        let mut camera = Camera {
            yaw: 0.0,
            pitch: 0.0,
            distance: 15.0,
        };
        let mut ui = Interaction::new(0.1);
        ui.press(MouseButton::Left, Vec2::ZERO);
        let target = cloth.positions()[4];
        assert_eq!(ui.select_at(&cloth, target), Some(4));

        cloth.set_velocity(4, Vec3::ONE);
        // 100 px right, 100 px up; 15 / 1500 = 0.01 units per px
        ui.drag(Vec2::new(100.0, -100.0), &mut cloth, &mut camera);
        let moved = cloth.positions()[4];
        assert!((moved - (target + Vec3::new(1.0, 1.0, 0.0))).length() < 1e-5);
        assert_eq!(cloth.velocities()[4], Vec3::ZERO);
    }

    #[test]
    fn test_drag_below_floor_keeps_height() {
        let mut cloth = small_cloth();
        let mut camera = Camera {
            yaw: 0.0,
            pitch: 0.0,
            distance: 15.0,
        };
        let mut ui = Interaction::new(0.1);
        ui.press(MouseButton::Left, Vec2::ZERO);
        ui.select_at(&cloth, cloth.positions()[0]);
        let start = cloth.positions()[0];
        // 1000 px down is 10 units, well below the floor at height 2
        ui.drag(Vec2::new(10.0, 1000.0), &mut cloth, &mut camera);
        let p = cloth.positions()[0];
        assert_eq!(p.y, start.y);
        assert!((p.x - (start.x + 0.1)).abs() < 1e-5);
    }

    #[test]
    fn test_release_clears_and_hold_zeroes() {
        let mut cloth = small_cloth();
        let mut ui = Interaction::new(0.1);
        ui.select_at(&cloth, cloth.positions()[2]);
        cloth.set_velocity(2, Vec3::X);
        ui.hold_selected(&mut cloth);
        assert_eq!(cloth.velocities()[2], Vec3::ZERO);

        ui.release();
        assert_eq!(ui.selected(), None);
        let flagged: Vec<bool> = ui.point_markers(&cloth).map(|(_, s)| s).collect();
        assert!(flagged.iter().all(|s| !s));
    }
}
