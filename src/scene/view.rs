use nalgebra::Point3;
use wasm_bindgen::JsValue;

use crate::config::hex_to_rgb;
use crate::engine::mesh::Mesh;
use crate::engine::renderer::{LineHandle, MeshHandle, Renderer};
use super::{BodyKind, SceneContext};

const ORBIT_OPACITY: f32 = 0.5;
const HALO_OPACITY: f32 = 0.2;

/// GPU resources for a scene, created once. Per frame only transforms,
/// colours and the eye-relative orbit vertices change.
pub struct SceneView {
    sphere: MeshHandle,
    /// Indexed by body id
    orbit_lines: Vec<Option<LineHandle>>,
    scratch: Vec<f32>,
}

impl SceneView {
    pub fn new(renderer: &Renderer, scene: &SceneContext) -> Result<Self, JsValue> {
        let sphere = renderer.upload_mesh(&Mesh::sphere(32, 32))?;
        let mut scratch = Vec::new();
        let mut orbit_lines = Vec::with_capacity(scene.bodies.len());
        for body in &scene.bodies {
            let line = match &body.orbit {
                Some(path) => {
                    path.write_vertices(&Point3::origin(), &mut scratch);
                    Some(renderer.upload_line(&scratch)?)
                }
                None => None,
            };
            orbit_lines.push(line);
        }

        Ok(SceneView { sphere, orbit_lines, scratch })
    }

    pub fn draw(&mut self, renderer: &Renderer, scene: &SceneContext, width: i32, height: i32) {
        renderer.resize(width, height);
        renderer.clear(0.0, 0.0, 0.0);
        renderer.enable_depth_test();

        let pose = scene.camera_pose();
        let projection = scene.camera.projection(aspect_ratio(width, height));
        renderer.set_camera(&projection, &pose.to_view(&Point3::origin()));
        let highlight = hex_to_rgb(scene.config.highlight_color);

        // Orbit vertices are rebased on the eye, leaving only the rotation
        let rotation = pose.model_view(&pose.eye, 1.0);
        renderer.enable_blend();
        for (body, line) in scene.bodies.iter().zip(&self.orbit_lines) {
            if let (Some(line), Some(path)) = (line, &body.orbit) {
                path.write_vertices(&pose.eye, &mut self.scratch);
                renderer.update_line(line, &self.scratch);
                renderer.draw_line(line, &rotation, body.orbit_color, ORBIT_OPACITY);
            }
        }
        renderer.disable_blend();

        for body in &scene.bodies {
            let color = if body.highlighted { highlight } else { body.color };
            renderer.draw_mesh(
                &self.sphere,
                &pose.model_view(&body.position, body.radius),
                color,
                body.kind != BodyKind::Star,
                1.0,
            );
        }

        if scene.halos_enabled() {
            renderer.enable_blend();
            for body in scene.bodies.iter().filter(|b| b.kind != BodyKind::Star) {
                renderer.draw_mesh(
                    &self.sphere,
                    &pose.model_view(&body.position, body.radius * scene.config.halo_scale),
                    body.color,
                    false,
                    HALO_OPACITY,
                );
            }
            renderer.disable_blend();
        }
    }
}

pub fn aspect_ratio(width: i32, height: i32) -> f32 {
    if width <= 0 || height <= 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}
