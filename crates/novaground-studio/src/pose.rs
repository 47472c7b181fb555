//! Rocket placement in the 3D view and its keyboard nudges.

use glam::{Mat4, Quat, Vec3};
use novaground_engine::input::Key;
use novaground_telemetry::TelemetryData;

/// Degrees per rotate action.
pub const ROTATE_STEP_DEG: f32 = 5.0;
/// World units per translate action.
pub const TRANSLATE_STEP: f32 = 1.0;

/// Manual adjustments bound to keys.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PoseAction {
    RotateLeft,
    RotateRight,
    RotateUp,
    RotateDown,
    TranslateForward,
    TranslateBackward,
    TranslateLeft,
    TranslateRight,
}

impl PoseAction {
    /// WASD rotates, arrows translate.
    pub fn for_key(key: Key) -> Option<Self> {
        Some(match key {
            Key::A => Self::RotateLeft,
            Key::D => Self::RotateRight,
            Key::W => Self::RotateUp,
            Key::S => Self::RotateDown,
            Key::ArrowUp => Self::TranslateForward,
            Key::ArrowDown => Self::TranslateBackward,
            Key::ArrowLeft => Self::TranslateLeft,
            Key::ArrowRight => Self::TranslateRight,
            _ => return None,
        })
    }
}

/// Position plus heading/pitch/roll in degrees.
///
/// Heading turns about world +Z, pitch about the rocket's X axis and roll
/// about its Y axis, applied in that order. Local +Y is "forward".
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RocketPose {
    pub position: Vec3,
    pub heading: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl RocketPose {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_z(self.heading.to_radians())
            * Quat::from_rotation_x(self.pitch.to_radians())
            * Quat::from_rotation_y(self.roll.to_radians())
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position)
    }

    pub fn apply(&mut self, action: PoseAction) {
        match action {
            PoseAction::RotateLeft => self.heading += ROTATE_STEP_DEG,
            PoseAction::RotateRight => self.heading -= ROTATE_STEP_DEG,
            PoseAction::RotateUp => self.pitch += ROTATE_STEP_DEG,
            PoseAction::RotateDown => self.pitch -= ROTATE_STEP_DEG,
            PoseAction::TranslateForward => self.translate_local(Vec3::Y),
            PoseAction::TranslateBackward => self.translate_local(Vec3::NEG_Y),
            PoseAction::TranslateLeft => self.translate_local(Vec3::NEG_X),
            PoseAction::TranslateRight => self.translate_local(Vec3::X),
        }
        log::debug!("pose action {action:?}: {self:?}");
    }

    fn translate_local(&mut self, dir: Vec3) {
        self.position += self.rotation() * (dir * TRANSLATE_STEP);
    }

    /// Overwrites position and orientation from a telemetry sample.
    pub fn follow(&mut self, data: &TelemetryData) {
        self.position = data.position;
        self.heading = data.yaw();
        self.pitch = data.pitch();
        self.roll = data.roll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn key_bindings() {
        assert_eq!(PoseAction::for_key(Key::A), Some(PoseAction::RotateLeft));
        assert_eq!(PoseAction::for_key(Key::S), Some(PoseAction::RotateDown));
        assert_eq!(PoseAction::for_key(Key::ArrowRight), Some(PoseAction::TranslateRight));
        assert_eq!(PoseAction::for_key(Key::Escape), None);
    }

    #[test]
    fn rotations_step_five_degrees() {
        let mut pose = RocketPose::default();
        pose.apply(PoseAction::RotateLeft);
        pose.apply(PoseAction::RotateLeft);
        pose.apply(PoseAction::RotateRight);
        assert_eq!(pose.heading, 5.0);
        pose.apply(PoseAction::RotateDown);
        assert_eq!(pose.pitch, -5.0);
        assert_eq!(pose.position, Vec3::ZERO);
    }

    #[test]
    fn translation_is_in_local_frame() {
        let mut pose = RocketPose::default();
        pose.apply(PoseAction::TranslateForward);
        assert_close(pose.position, Vec3::Y);

        let mut turned = RocketPose { heading: 90.0, ..Default::default() };
        turned.apply(PoseAction::TranslateForward);
        assert_close(turned.position, Vec3::NEG_X);
        turned.apply(PoseAction::TranslateRight);
        assert_close(turned.position, Vec3::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn forward_then_back_returns() {
        let mut pose = RocketPose { heading: 30.0, pitch: 20.0, ..Default::default() };
        pose.apply(PoseAction::TranslateForward);
        pose.apply(PoseAction::TranslateBackward);
        assert_close(pose.position, Vec3::ZERO);
    }

    #[test]
    fn model_matrix_places_tail_at_position() {
        let pose = RocketPose { position: Vec3::new(3.0, 4.0, 5.0), heading: 45.0, ..Default::default() };
        assert_close(pose.model_matrix().transform_point3(Vec3::ZERO), pose.position);
    }

    #[test]
    fn telemetry_overrides_pose() {
        let mut data = TelemetryData::on_pad(Utc::now());
        data.position = Vec3::new(1.0, 2.0, 30.0);
        data.orientation = Vec3::new(10.0, 20.0, 30.0);

        let mut pose = RocketPose { heading: 90.0, ..Default::default() };
        pose.follow(&data);
        assert_eq!(pose.position, data.position);
        assert_eq!((pose.pitch, pose.heading, pose.roll), (10.0, 20.0, 30.0));
    }
}
