//! Orbit camera for viewing and picking the cloth.

use glam::{Mat4, Vec2, Vec3};

/// Vertical field of view in degrees.
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 80.0;

/// Camera that sits `distance` units back from the origin after rotating the
/// world by `pitch` about X and `yaw` about Y.
///
/// The view matrix is `T(0, 0, -distance) * Rx(pitch) * Ry(yaw)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Rotation about the world Y axis in radians.
    pub yaw: f32,
    /// Rotation about the camera X axis in radians.
    pub pitch: f32,
    /// Distance from the orbit center.
    pub distance: f32,
}

impl Camera {
    /// Reference framing: 15 units back, tilted down 15 degrees.
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 15.0_f32.to_radians(),
            distance: 15.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(self.pitch)
            * Mat4::from_rotation_y(self.yaw)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, NEAR, FAR)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }

    /// Camera world position.
    pub fn position(&self) -> Vec3 {
        self.view_matrix().inverse().transform_point3(Vec3::ZERO)
    }

    /// Unit vector the camera looks along, in world space.
    pub fn view_dir(&self) -> Vec3 {
        -self.view_matrix().row(2).truncate()
    }

    /// Horizontal drag axis: `view_dir x up` with world up.
    ///
    /// Not normalized; it shrinks as the camera looks straight up or down.
    pub fn right(&self) -> Vec3 {
        self.view_dir().cross(Vec3::Y)
    }

    /// Map a cursor position (pixels, origin top-left) and a depth-buffer value
    /// back into world space.
    ///
    /// A depth of `1.0` means the cursor is over background; it is treated as
    /// the near plane.
    pub fn unproject(&self, cursor: Vec2, depth: f32, viewport: Vec2) -> Vec3 {
        let depth = if depth >= 1.0 { 0.0 } else { depth };
        let ndc = Vec3::new(
            cursor.x / viewport.x * 2.0 - 1.0,
            1.0 - cursor.y / viewport.y * 2.0,
            depth,
        );
        let aspect = viewport.x / viewport.y;
        self.view_proj(aspect).inverse().project_point3(ndc)
    }

    /// Project a world point to cursor pixels and depth. `None` if behind the
    /// camera.
    pub fn project(&self, world: Vec3, viewport: Vec2) -> Option<(Vec2, f32)> {
        let aspect = viewport.x / viewport.y;
        let clip = self.view_proj(aspect) * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let cursor = Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        );
        Some((cursor, ndc.z))
    }

    /// Rotate by a drag of `delta` pixels, 5 pixels per degree.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw += (delta.x / 5.0).to_radians();
        self.pitch += (delta.y / 5.0).to_radians();
    }

    /// Dolly by a vertical drag of `dy` pixels: 60 pixels scale distance by 2x.
    pub fn zoom(&mut self, dy: f32) {
        self.distance = (self.distance * (1.0 + dy / 60.0)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = Camera {
            yaw: 0.0,
            pitch: 0.0,
            distance: 10.0,
        };
        assert!((cam.view_dir() - Vec3::NEG_Z).length() < 1e-6);
        assert!((cam.position() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
        assert!((cam.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_unproject_round_trip() {
        let cam = Camera::new();
        let world = Vec3::new(0.5, 1.0, 2.0);
        let (cursor, depth) = cam.project(world, VIEWPORT).unwrap();
        let back = cam.unproject(cursor, depth, VIEWPORT);
        assert!((back - world).length() < 1e-2, "{back} vs {world}");
    }

    #[test]
    fn test_background_depth_maps_to_near_plane() {
        let cam = Camera::new();
        let center = VIEWPORT / 2.0;
        let p = cam.unproject(center, 1.0, VIEWPORT);
        assert!((p.distance(cam.position()) - NEAR).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = Camera::new();
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, MIN_DISTANCE);
        cam.zoom(60.0);
        assert_eq!(cam.distance, MIN_DISTANCE * 2.0);
    }

    #[test]
    fn test_orbit_degrees_per_pixel() {
        let mut cam = Camera::new();
        let pitch = cam.pitch;
        cam.orbit(Vec2::new(450.0, 5.0));
        assert!((cam.yaw - 90f32.to_radians()).abs() < 1e-6);
        assert!((cam.pitch - pitch - 1f32.to_radians()).abs() < 1e-6);
    }
}
