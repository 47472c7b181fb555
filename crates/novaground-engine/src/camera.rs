//! Perspective camera producing the view-projection half of the MVP uniform.

use glam::{Mat4, Vec3};

/// Camera view with a perspective projection.
///
/// World space is right-handed with +Z up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub eye: Vec3,

    /// Point the camera looks at.
    pub target: Vec3,

    pub up: Vec3,

    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,

    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Camera {
    /// Pulled back along -Y, level with the origin, 60° FOV.
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, -100.0, 0.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov_y_deg: 60.0,
            z_near: 0.1,
            z_far: 5000.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Projection for a viewport with the given aspect (width / height).
    ///
    /// Degenerate aspects (zero-sized or minimized windows) fall back to 1.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Moves the eye along the view direction, keeping at least `min_distance`
    /// to the target.
    pub fn dolly(&mut self, amount: f32, min_distance: f32) {
        let offset = self.eye - self.target;
        let distance = (offset.length() - amount).max(min_distance);
        self.eye = self.target + offset.normalize_or(Vec3::NEG_Y) * distance;
    }

    /// Orbits the eye around the target about the world up axis.
    pub fn orbit(&mut self, yaw_deg: f32) {
        let rot = Mat4::from_axis_angle(self.up.normalize_or(Vec3::Z), yaw_deg.to_radians());
        self.eye = self.target + rot.transform_vector3(self.eye - self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn ndc(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * p.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = Camera::default();
        let p = ndc(cam.view_proj(4.0 / 3.0), cam.target);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&p.z));
    }

    #[test]
    fn plus_z_is_up_and_plus_x_is_right() {
        let cam = Camera::default();
        let m = cam.view_proj(1.0);
        assert!(ndc(m, Vec3::new(0.0, 0.0, 10.0)).y > 0.0);
        assert!(ndc(m, Vec3::new(10.0, 0.0, 0.0)).x > 0.0);
    }

    #[test]
    fn point_behind_eye_has_negative_w() {
        let cam = Camera::default();
        let clip = cam.view_proj(1.0) * Vec4::new(0.0, -200.0, 0.0, 1.0);
        assert!(clip.w < 0.0);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let cam = Camera::default();
        assert_eq!(cam.projection(0.0), cam.projection(1.0));
        assert_eq!(cam.projection(f32::NAN), cam.projection(1.0));
    }

    #[test]
    fn dolly_clamps_to_min_distance() {
        let mut cam = Camera::default();
        cam.dolly(30.0, 5.0);
        assert!((cam.eye.distance(cam.target) - 70.0).abs() < 1e-4);
        cam.dolly(1000.0, 5.0);
        assert!((cam.eye.distance(cam.target) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = Camera::default();
        cam.orbit(90.0);
        assert!((cam.eye.distance(cam.target) - 100.0).abs() < 1e-3);
        assert!((cam.eye.x - 100.0).abs() < 1e-3);
    }
}
