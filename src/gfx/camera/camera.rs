//! Free and target-locked cameras.
//!
//! A camera is an eye point, a look target, and an up direction. A camera
//! may also be attached to a scene object; the scene then re-aims it every
//! frame at that object's current world position, with the stored eye
//! treated as an offset in the object's local frame.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};

use crate::gfx::scene::ObjectId;

/// Maps OpenGL clip space (z in -1..1) onto wgpu clip space (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

const FOVY: Deg<f32> = Deg(45.0);
const ZNEAR: f32 = 0.1;
const ZFAR: f32 = 1000.0;

/// Projection shared by every camera, corrected for wgpu clip space.
pub fn projection_matrix(aspect: f32) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX * cgmath::perspective(FOVY, aspect, ZNEAR, ZFAR)
}

/// Builds a view matrix, nudging the target when it coincides with the
/// eye. A zero look direction cannot be normalized and would fill the
/// view matrix with NaN, so a degenerate pair is perturbed instead of
/// trusted.
fn guarded_look_at(eye: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let mut target = target;
    if (target - eye).magnitude2() < 1e-12 {
        log::warn!("camera eye coincides with its target, nudging the target");
        target.z += 1e-3;
    }
    Matrix4::look_at_rh(eye, target, up)
}

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    initial_eye: Point3<f32>,
    eye: Point3<f32>,
    target: Point3<f32>,
    up: Vector3<f32>,
    parent: Option<ObjectId>,
    view: Matrix4<f32>,
}

impl Camera {
    /// Camera at the given eye position, looking at the origin with +Y up.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        let eye = Point3::new(x, y, z);
        let target = Point3::origin();
        let up = Vector3::unit_y();
        Self {
            initial_eye: eye,
            eye,
            target,
            up,
            parent: None,
            view: guarded_look_at(eye, target, up),
        }
    }

    /// Attaches the camera to an object. From now on the eye is an offset
    /// in that object's local frame and the scene re-aims the camera at
    /// the object every frame.
    pub fn attach_to(&mut self, parent: Option<ObjectId>) {
        self.parent = parent;
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.eye = Point3::new(x, y, z);
        self.refresh();
    }

    pub fn translate_by(&mut self, dx: f32, dy: f32, dz: f32) {
        self.eye += Vector3::new(dx, dy, dz);
        self.refresh();
    }

    pub fn set_target(&mut self, x: f32, y: f32, z: f32) {
        self.target = Point3::new(x, y, z);
        self.refresh();
    }

    /// Back to the construction-time eye, looking at the origin.
    pub fn reset(&mut self) {
        self.eye = self.initial_eye;
        self.target = Point3::origin();
        self.refresh();
    }

    /// Eye position actually used for rendering: the stored eye run
    /// through the parent's world transform when attached, the stored eye
    /// itself otherwise.
    pub fn effective_eye(&self, parent_world: Option<Matrix4<f32>>) -> Point3<f32> {
        match (self.parent, parent_world) {
            (Some(_), Some(world)) => {
                let eye = world * self.eye.to_homogeneous();
                Point3::new(eye.x, eye.y, eye.z)
            }
            _ => self.eye,
        }
    }

    /// Re-aims an attached camera: the view is rebuilt from the
    /// world-space eye toward the target's world position.
    pub fn lock_onto(&mut self, target: Point3<f32>, parent_world: Matrix4<f32>) {
        let eye = parent_world * self.eye.to_homogeneous();
        let eye = Point3::new(eye.x, eye.y, eye.z);
        self.target = target;
        self.view = guarded_look_at(eye, target, self.up);
    }

    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    fn refresh(&mut self) {
        self.view = guarded_look_at(self.eye, self.target, self.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    fn finite(m: Matrix4<f32>) -> bool {
        let cols: [[f32; 4]; 4] = m.into();
        cols.iter().flatten().all(|v| v.is_finite())
    }

    #[test]
    fn view_looks_down_negative_z() {
        let camera = Camera::new(0.0, 0.0, 5.0);
        let target_in_view = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(target_in_view.z < 0.0);
    }

    #[test]
    fn coincident_eye_and_target_stay_finite() {
        let mut camera = Camera::new(0.0, 0.0, 5.0);
        camera.set_target(0.0, 0.0, 5.0);
        assert!(finite(camera.view_matrix()));

        // Same guard on the locked path.
        camera.lock_onto(Point3::new(0.0, 0.0, 5.0), Matrix4::from_scale(1.0));
        assert!(finite(camera.view_matrix()));
    }

    #[test]
    fn effective_eye_follows_parent_world() {
        let mut camera = Camera::new(1.0, 0.0, 0.0);
        camera.attach_to(Some(crate::gfx::scene::scene::ObjectId(0)));
        let world = Matrix4::from_translation(Vector3::new(0.0, 10.0, 0.0));
        assert_eq!(camera.effective_eye(Some(world)), Point3::new(1.0, 10.0, 0.0));
    }

    #[test]
    fn unattached_camera_ignores_world_matrices() {
        let camera = Camera::new(1.0, 2.0, 3.0);
        let world = Matrix4::from_translation(Vector3::new(9.0, 9.0, 9.0));
        assert_eq!(camera.effective_eye(Some(world)), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn reset_restores_construction_state() {
        let mut camera = Camera::new(0.0, 1.0, 4.0);
        camera.translate_by(5.0, 5.0, 5.0);
        camera.set_target(1.0, 1.0, 1.0);
        camera.reset();
        assert_eq!(camera.eye(), Point3::new(0.0, 1.0, 4.0));
    }

    #[test]
    fn projection_is_finite_for_common_aspects() {
        for aspect in [0.5, 1.0, 16.0 / 9.0] {
            assert!(finite(projection_matrix(aspect)));
        }
    }
}
