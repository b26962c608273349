//! Street-scene assembly
//!
//! Loads the demo assets (car, bunny, street lamp, street, stop sign, sky
//! faces) from an asset directory, wires up the object hierarchy and the
//! two cameras, and hands back the pivot handles the frame loop animates.
//!
//! The hierarchy: the car hangs off an invisible spinning pivot, the bunny
//! rides the car, camera 0 hangs off its own rig pivot, and camera 1 is
//! locked onto the bunny.

use std::path::Path;

use anyhow::Context;
use cgmath::Deg;

use crate::gfx::geometry::{cube_face, CubeFace};
use crate::gfx::resources::loader;
use crate::gfx::scene::{Mesh, Object, ObjectId, Scene};
use crate::gfx::wavefront::WavefrontSession;
use crate::gfx::camera::Camera;

/// Objects the application animates per frame.
pub struct SceneHandles {
    /// Invisible pivot the car orbits around.
    pub car_pivot: ObjectId,
    /// Invisible pivot camera 0 rides on.
    pub camera_rig: ObjectId,
}

/// Parses one OBJ/MTL pair into an object, attaching the material's
/// diffuse texture when the library names one.
fn load_object(asset_dir: &Path, name: &str) -> anyhow::Result<Object> {
    let mut session = WavefrontSession::new();

    let mtl_path = asset_dir.join(format!("{name}.mtl"));
    if mtl_path.exists() {
        session.parse_mtl(&loader::load_text(&mtl_path)?);
    }

    let obj_path = asset_dir.join(format!("{name}.obj"));
    session
        .parse_obj(&loader::load_text(&obj_path)?)
        .with_context(|| format!("parsing {}", obj_path.display()))?;

    let texture_path = session
        .materials()
        .diffuse_texture()
        .map(|file| asset_dir.join(file));

    let mut object = Object::new(name, Mesh::new(session.into_mesh()));
    if let Some(path) = texture_path {
        object = object.with_texture(loader::load_rgba_image(&path)?);
    }

    log::info!("loaded {name}");
    Ok(object)
}

fn load_sky_faces(asset_dir: &Path) -> anyhow::Result<Box<[image::RgbaImage; 6]>> {
    let mut faces = Vec::with_capacity(6);
    for suffix in ["posx", "negx", "posy", "negy", "posz", "negz"] {
        faces.push(loader::load_rgba_image(
            &asset_dir.join(format!("skybox_{suffix}.png")),
        )?);
    }
    let faces: [image::RgbaImage; 6] = faces
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected six sky faces"))?;
    Ok(Box::new(faces))
}

/// Builds the whole street scene into `scene`.
///
/// Returns the animation handles and the six sky images for the
/// environment cube map.
pub fn build_street_scene(
    scene: &mut Scene,
    asset_dir: &Path,
) -> anyhow::Result<(SceneHandles, Box<[image::RgbaImage; 6]>)> {
    let mut car = load_object(asset_dir, "car")?;
    car.set_position(3.0, -0.2, 0.0);
    car.casts_shadow = true;
    let car = scene.add_object(car);

    let mut bunny = load_object(asset_dir, "bunny")?;
    bunny.set_position(0.0, 0.7, 1.5);
    let bunny = scene.add_object(bunny);

    let lamp = load_object(asset_dir, "lamp")?;
    scene.add_object(lamp);

    let street = load_object(asset_dir, "street")?;
    scene.add_object(street);

    let mut stop_sign = load_object(asset_dir, "stopsign")?;
    stop_sign.set_position(4.5, 0.0, -2.0);
    stop_sign.rotate_y(Deg(-90.0));
    stop_sign.casts_shadow = true;
    scene.add_object(stop_sign);

    // Invisible pivots: the car orbits one, camera 0 rides the other.
    let mut car_pivot_object = Object::new("car-pivot", Mesh::empty());
    car_pivot_object.animated = true;
    let car_pivot = scene.add_object(car_pivot_object);
    let camera_rig = scene.add_object(Object::new("camera-rig", Mesh::empty()));

    scene.set_parent(car, Some(car_pivot))?;
    scene.set_parent(bunny, Some(car))?;

    let sky_faces = load_sky_faces(asset_dir)?;
    build_background(scene, &sky_faces);

    let mut main_camera = Camera::new(0.0, 4.0, 7.0);
    main_camera.attach_to(Some(camera_rig));
    scene.add_camera(main_camera);

    let mut chase_camera = Camera::new(-1.0, 0.5, -1.0);
    chase_camera.attach_to(Some(bunny));
    scene.add_camera(chase_camera);

    log::info!("street scene assembled");
    Ok((SceneHandles { car_pivot, camera_rig }, sky_faces))
}

/// Six textured quads scaled negative so they face inward around the
/// viewer. Face images and orientations follow the sky plate layout.
fn build_background(scene: &mut Scene, sky: &[image::RgbaImage; 6]) {
    // (face, image index in +x,-x,+y,-y,+z,-z order, orientation)
    let placements: [(CubeFace, usize, fn(&mut Object)); 6] = [
        (CubeFace::Front, 4, |o| o.rotate_z(Deg(180.0))),
        (CubeFace::Right, 1, |o| o.rotate_x(Deg(180.0))),
        (CubeFace::Bottom, 2, |o| o.rotate_y(Deg(90.0))),
        (CubeFace::Top, 3, |o| o.rotate_y(Deg(270.0))),
        (CubeFace::Back, 5, |o| o.rotate_z(Deg(90.0))),
        (CubeFace::Left, 0, |o| o.rotate_x(Deg(180.0))),
    ];

    for (face, image_index, orient) in placements {
        let mesh = Mesh::new(cube_face(face));
        let mut object = Object::new(format!("sky-{face:?}").to_lowercase(), mesh)
            .with_texture(sky[image_index].clone());
        object.set_scale(-75.0, -75.0, -75.0);
        orient(&mut object);
        object.is_background = true;
        scene.add_object(object);
    }
}
