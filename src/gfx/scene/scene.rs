//! # Scene Graph
//!
//! A flat arena of [`Object`]s with parent links by [`ObjectId`]. World
//! transforms are never cached: every query walks the parent chain and
//! multiplies local matrices on the spot, so a parent moved this frame is
//! reflected in every descendant's next query with no invalidation
//! bookkeeping.

use cgmath::{Matrix4, Point3, Vector3, Vector4};
use thiserror::Error;

use super::object::Object;
use crate::gfx::camera::Camera;
use crate::wgpu_utils::BindGroupLayoutWithDesc;

/// Handle to an object in a [`Scene`] arena.
///
/// Ids are only ever minted by [`Scene::add_object`] and objects are never
/// removed, so a held id stays valid for the scene's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) usize);

#[derive(Debug, Error)]
pub enum SceneError {
    /// Reparenting was refused because the new parent is the object itself
    /// or one of its descendants.
    #[error("setting parent of `{child}` to `{parent}` would create a cycle")]
    ParentCycle { child: String, parent: String },
}

/// Render feature toggles, flipped from the keyboard at runtime.
#[derive(Debug, Clone, Copy)]
pub struct RenderFlags {
    pub lighting: bool,
    pub shadows: bool,
    pub reflections: bool,
    pub refractions: bool,
    pub background: bool,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            lighting: true,
            shadows: false,
            reflections: false,
            refractions: false,
            background: false,
        }
    }
}

/// All objects, cameras, and global lighting state for one viewer run.
pub struct Scene {
    objects: Vec<Object>,
    pub cameras: Vec<Camera>,
    active_camera: usize,
    pub light_position: Vector3<f32>,
    pub flags: RenderFlags,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            cameras: Vec::new(),
            active_camera: 0,
            light_position: Vector3::new(0.0, 3.0, 0.0),
            flags: RenderFlags::default(),
        }
    }

    pub fn add_object(&mut self, object: Object) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.0]
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Links `child` under `parent`, or detaches it when `parent` is
    /// `None`. Fails if the link would make the graph cyclic, which keeps
    /// every world transform query guaranteed to terminate.
    pub fn set_parent(
        &mut self,
        child: ObjectId,
        parent: Option<ObjectId>,
    ) -> Result<(), SceneError> {
        if let Some(parent) = parent {
            let mut ancestor = Some(parent);
            while let Some(id) = ancestor {
                if id == child {
                    return Err(SceneError::ParentCycle {
                        child: self.objects[child.0].name.clone(),
                        parent: self.objects[parent.0].name.clone(),
                    });
                }
                ancestor = self.objects[id.0].parent;
            }
        }
        self.objects[child.0].parent = parent;
        Ok(())
    }

    /// World transform of `id`, recomputed from the parent chain.
    pub fn world_matrix(&self, id: ObjectId) -> Matrix4<f32> {
        let mut world = self.objects[id.0].local_matrix();
        let mut parent = self.objects[id.0].parent;
        while let Some(id) = parent {
            world = self.objects[id.0].local_matrix() * world;
            parent = self.objects[id.0].parent;
        }
        world
    }

    /// Where `id`'s local origin lands in world space.
    pub fn world_position(&self, id: ObjectId) -> Point3<f32> {
        let origin = self.world_matrix(id) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        Point3::new(origin.x, origin.y, origin.z)
    }

    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    /// Cycles to the next camera, wrapping around.
    pub fn next_camera(&mut self) {
        if !self.cameras.is_empty() {
            self.active_camera = (self.active_camera + 1) % self.cameras.len();
        }
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera]
    }

    pub fn active_camera_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active_camera]
    }

    pub fn move_light(&mut self, dx: f32, dy: f32, dz: f32) {
        self.light_position += Vector3::new(dx, dy, dz);
    }

    /// Uploads every object's mesh and uniform state.
    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        object_layout: &BindGroupLayoutWithDesc,
        texture_layout: &BindGroupLayoutWithDesc,
    ) {
        for object in &mut self.objects {
            object.init_gpu_resources(device, queue, object_layout, texture_layout);
        }
    }

    /// Per-frame upkeep: parented cameras chase their target's current
    /// world position, then every object's world matrix goes to the GPU.
    pub fn update(&mut self, queue: &wgpu::Queue) {
        for i in 0..self.cameras.len() {
            if let Some(target) = self.cameras[i].parent() {
                let target_position = self.world_position(target);
                let parent_world = self.world_matrix(target);
                self.cameras[i].lock_onto(target_position, parent_world);
            }
        }

        let worlds: Vec<Matrix4<f32>> = (0..self.objects.len())
            .map(|i| self.world_matrix(ObjectId(i)))
            .collect();
        for (object, world) in self.objects.iter_mut().zip(worlds) {
            object.write_world_matrix(queue, world);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::object::Mesh;

    fn plain_object(name: &str) -> Object {
        let mut session = crate::gfx::wavefront::WavefrontSession::new();
        session
            .parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .unwrap();
        Object::new(name, Mesh::new(session.into_mesh()))
    }

    fn approx_point(p: Point3<f32>, expected: [f32; 3]) -> bool {
        (p.x - expected[0]).abs() < 1e-4
            && (p.y - expected[1]).abs() < 1e-4
            && (p.z - expected[2]).abs() < 1e-4
    }

    #[test]
    fn world_transforms_compose_down_the_chain() {
        let mut scene = Scene::new();
        let root = scene.add_object(plain_object("root"));
        let child = scene.add_object(plain_object("child"));
        scene.set_parent(child, Some(root)).unwrap();

        scene.object_mut(root).set_position(10.0, 0.0, 0.0);
        scene.object_mut(child).set_position(0.0, 2.0, 0.0);

        assert!(approx_point(scene.world_position(child), [10.0, 2.0, 0.0]));
    }

    #[test]
    fn parent_motion_is_visible_without_invalidation() {
        let mut scene = Scene::new();
        let root = scene.add_object(plain_object("root"));
        let child = scene.add_object(plain_object("child"));
        scene.set_parent(child, Some(root)).unwrap();

        scene.object_mut(root).set_position(1.0, 0.0, 0.0);
        assert!(approx_point(scene.world_position(child), [1.0, 0.0, 0.0]));

        // Move the parent again; the child's next query sees it.
        scene.object_mut(root).set_position(-3.0, 0.0, 0.0);
        assert!(approx_point(scene.world_position(child), [-3.0, 0.0, 0.0]));
    }

    #[test]
    fn parent_rotation_orbits_children() {
        let mut scene = Scene::new();
        let pivot = scene.add_object(plain_object("pivot"));
        let rider = scene.add_object(plain_object("rider"));
        scene.set_parent(rider, Some(pivot)).unwrap();

        scene.object_mut(rider).set_position(1.0, 0.0, 0.0);
        scene.object_mut(pivot).rotate_y(cgmath::Deg(90.0));

        assert!(approx_point(scene.world_position(rider), [0.0, 0.0, -1.0]));
    }

    #[test]
    fn self_parenting_is_rejected() {
        let mut scene = Scene::new();
        let a = scene.add_object(plain_object("a"));
        assert!(scene.set_parent(a, Some(a)).is_err());
    }

    #[test]
    fn transitive_cycles_are_rejected() {
        let mut scene = Scene::new();
        let a = scene.add_object(plain_object("a"));
        let b = scene.add_object(plain_object("b"));
        let c = scene.add_object(plain_object("c"));
        scene.set_parent(b, Some(a)).unwrap();
        scene.set_parent(c, Some(b)).unwrap();

        let err = scene.set_parent(a, Some(c)).unwrap_err();
        assert!(matches!(err, SceneError::ParentCycle { .. }));
        // The failed call must not have linked anything.
        assert!(scene.object(a).parent().is_none());
    }

    #[test]
    fn detaching_restores_local_placement() {
        let mut scene = Scene::new();
        let root = scene.add_object(plain_object("root"));
        let child = scene.add_object(plain_object("child"));
        scene.set_parent(child, Some(root)).unwrap();
        scene.object_mut(root).set_position(5.0, 5.0, 5.0);

        scene.set_parent(child, None).unwrap();
        assert!(approx_point(scene.world_position(child), [0.0, 0.0, 0.0]));
    }

    #[test]
    fn cameras_cycle_and_wrap() {
        let mut scene = Scene::new();
        scene.add_camera(Camera::new(0.0, 0.0, 5.0));
        scene.add_camera(Camera::new(3.0, 3.0, 3.0));
        assert_eq!(scene.active_camera, 0);
        scene.next_camera();
        assert_eq!(scene.active_camera, 1);
        scene.next_camera();
        assert_eq!(scene.active_camera, 0);
    }
}
