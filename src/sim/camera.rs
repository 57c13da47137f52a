//! Camera rig
//!
//! Sways the camera back and forth on a fixed arc around the origin with a
//! slow vertical bob. Also owns the projection used for picking and for
//! placing the result label.

use glam::{Mat4, Vec2, Vec3};

use crate::consts::*;

/// Oscillation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigParams {
    /// Distance from the origin
    pub radius: f32,
    /// Maximum horizontal swing either side of +Z (radians)
    pub arc_half_angle: f32,
    /// Time multiplier
    pub speed: f32,
    /// Vertical bob amplitude
    pub y_offset: f32,
}

impl Default for RigParams {
    fn default() -> Self {
        Self {
            radius: CAMERA_RADIUS,
            arc_half_angle: CAMERA_ARC_HALF_ANGLE_DEG.to_radians(),
            speed: CAMERA_SPEED,
            y_offset: CAMERA_Y_OFFSET,
        }
    }
}

impl RigParams {
    /// Parameters with sway disabled (camera parked at the base position)
    pub fn still() -> Self {
        Self {
            speed: 0.0,
            ..Self::default()
        }
    }
}

/// Camera on an oscillating arc, always aimed at the origin
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub params: RigParams,
    /// Accumulated oscillation time
    pub time: f32,
    pub position: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
}

impl CameraRig {
    pub fn new(params: RigParams, aspect: f32) -> Self {
        let mut rig = Self {
            params,
            time: 0.0,
            position: Vec3::new(0.0, 0.0, params.radius),
            fov_y: CAMERA_FOV_Y_DEG.to_radians(),
            aspect,
        };
        rig.place();
        rig
    }

    /// Current horizontal swing angle
    pub fn angle_offset(&self) -> f32 {
        self.time.sin() * self.params.arc_half_angle
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt * self.params.speed;
        self.place();
    }

    fn place(&mut self) {
        let angle = self.angle_offset();
        let r = self.params.radius;
        self.position = Vec3::new(
            angle.sin() * r,
            (self.time * 0.5).sin() * self.params.y_offset,
            angle.cos() * r,
        );
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect.max(1e-6);
    }

    /// Unit vector from the camera toward the origin
    pub fn forward(&self) -> Vec3 {
        (-self.position).normalize_or_zero()
    }

    /// Orthonormal (right, up) basis for the current aim
    pub fn basis(&self) -> (Vec3, Vec3) {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        (right, up)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, 0.1, 100.0)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point given in normalized [0,1] screen
    /// coordinates (origin top-left)
    pub fn screen_ray(&self, uv: Vec2) -> (Vec3, Vec3) {
        let ndc = Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);
        let tan_half = (self.fov_y * 0.5).tan();
        let (right, up) = self.basis();
        let dir = self.forward()
            + right * (ndc.x * tan_half * self.aspect)
            + up * (ndc.y * tan_half);
        (self.position, dir.normalize())
    }

    /// Project a world point to normalized [0,1] screen coordinates
    /// (origin top-left). None when the point is behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new((ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_on_z_axis() {
        let rig = CameraRig::new(RigParams::default(), 1.0);
        assert!(rig.position.abs_diff_eq(Vec3::new(0.0, 0.0, CAMERA_RADIUS), 1e-5));
    }

    #[test]
    fn test_still_rig_never_moves() {
        let mut rig = CameraRig::new(RigParams::still(), 1.0);
        for _ in 0..100 {
            rig.update(0.016);
        }
        assert!(rig.position.abs_diff_eq(Vec3::new(0.0, 0.0, CAMERA_RADIUS), 1e-5));
    }

    #[test]
    fn test_center_ray_hits_origin_direction() {
        let mut rig = CameraRig::new(RigParams::default(), 1.6);
        rig.update(0.7);
        let (origin, dir) = rig.screen_ray(Vec2::splat(0.5));
        assert!(dir.abs_diff_eq(rig.forward(), 1e-5));
        assert_eq!(origin, rig.position);
    }

    #[test]
    fn test_project_origin_is_screen_center() {
        let mut rig = CameraRig::new(RigParams::default(), 1.3);
        rig.update(1.1);
        let p = rig.project(Vec3::ZERO).unwrap();
        assert!(p.abs_diff_eq(Vec2::splat(0.5), 1e-4));
    }

    #[test]
    fn test_label_point_above_center() {
        let rig = CameraRig::new(RigParams::default(), 1.0);
        let p = rig.project(Vec3::new(0.0, LABEL_HEIGHT, 0.0)).unwrap();
        assert!(p.y < 0.5);
        assert!((p.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_ray_and_projection_agree() {
        let mut rig = CameraRig::new(RigParams::default(), 1.5);
        rig.update(2.3);
        let uv = Vec2::new(0.3, 0.7);
        let (origin, dir) = rig.screen_ray(uv);
        let p = rig.project(origin + dir * 7.0).unwrap();
        assert!(p.abs_diff_eq(uv, 1e-3));
    }

    proptest! {
        #[test]
        fn prop_swing_stays_on_arc(steps in proptest::collection::vec(0.0f32..0.5, 1..200)) {
            let mut rig = CameraRig::new(RigParams::default(), 1.0);
            let half = RigParams::default().arc_half_angle;
            for dt in steps {
                rig.update(dt);
                prop_assert!(rig.angle_offset().abs() <= half + 1e-6);
                let horizontal = Vec2::new(rig.position.x, rig.position.z).length();
                prop_assert!((horizontal - CAMERA_RADIUS).abs() < 1e-3);
                prop_assert!(rig.position.y.abs() <= CAMERA_Y_OFFSET + 1e-6);
                prop_assert!(rig.position.z > 0.0);
            }
        }
    }
}
