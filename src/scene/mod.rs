pub mod clock;
pub mod view;

use std::f64::consts::TAU;

use nalgebra::{Point3, Vector3};

use crate::config::{hex_to_rgb, AppConfig};
use crate::engine::camera::{CameraPose, FlyTo, OrbitCamera};
use crate::engine::picking::{pick, Ray};
use crate::orbit::{position_at, sample, KeplerSettings, OrbitPath, OrbitalElements, Position};
use crate::provider::{BodyRecord, Catalog};
use self::clock::SimulationClock;

const SUN_COLOR: (f32, f32, f32) = (1.0, 1.0, 0.0);
const MOON_COLOR: (f32, f32, f32) = (0.67, 0.67, 0.67);
/// Orbit lines are pulled this far towards white
const ORBIT_WHITE_MIX: f32 = 0.1;
const INITIAL_CAMERA_DISTANCE: f64 = 10_000_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyKind {
    Star,
    Planet,
    Moon { parent: BodyId, index: usize, count: usize },
}

pub struct Body {
    pub id: BodyId,
    pub name: String,
    pub kind: BodyKind,
    /// Scene units
    pub radius: f64,
    pub color: (f32, f32, f32),
    pub orbit_color: (f32, f32, f32),
    /// Elements after distance scaling
    pub elements: Option<OrbitalElements>,
    pub orbit: Option<OrbitPath>,
    pub position: Position,
    pub highlighted: bool,
}

/// Offset of moon `index` of `count` from its planet.
pub fn moon_offset(planet_radius: f64, index: usize, count: usize) -> Vector3<f64> {
    let distance = planet_radius * 2.0 * (index + 1) as f64;
    let angle = index as f64 / count.max(1) as f64 * TAU;
    Vector3::new(distance * angle.cos(), distance * angle.sin(), 0.0)
}

fn mix_towards_white(color: (f32, f32, f32), amount: f32) -> (f32, f32, f32) {
    let mix = |c: f32| c + (1.0 - c) * amount;
    (mix(color.0), mix(color.1), mix(color.2))
}

/// All mutable state of the visualization: bodies, time, camera and
/// selection. Owned by the entry point and handed to the render loop and the
/// input handlers.
pub struct SceneContext {
    pub config: AppConfig,
    pub bodies: Vec<Body>,
    pub clock: SimulationClock,
    pub camera: OrbitCamera,
    settings: KeplerSettings,
    fly: Option<FlyTo>,
    follow: Option<BodyId>,
    hovered: Option<BodyId>,
    selected: Option<BodyId>,
    halos_enabled: bool,
    info_visible: bool,
    info_text: String,
    now_ms: f64,
}

impl SceneContext {
    pub fn from_catalog(config: AppConfig, catalog: &Catalog) -> Self {
        let mut scene = SceneContext {
            settings: config.kepler_settings(),
            clock: SimulationClock::new(config.speed_multiplier),
            camera: OrbitCamera::new(INITIAL_CAMERA_DISTANCE),
            config,
            bodies: Vec::new(),
            fly: None,
            follow: None,
            hovered: None,
            selected: None,
            halos_enabled: false,
            info_visible: false,
            info_text: String::new(),
            now_ms: 0.0,
        };

        if catalog.is_empty() {
            log::warn!("Catalog is empty; starting without bodies");
        }

        match &catalog.sun {
            Some(sun) => scene.add_sun(sun),
            None => log::error!("No Sun data fetched."),
        }

        if catalog.planets.is_empty() {
            log::error!("No planets data fetched or empty array.");
        }
        for record in &catalog.planets {
            scene.add_orbiting(record, false);
        }

        match &catalog.pluto {
            Some(pluto) => {
                scene.add_orbiting(pluto, true);
            }
            None => log::error!("No Pluto data fetched."),
        }

        log::info!("Scene built with {} bodies", scene.bodies.len());
        scene
    }

    fn next_id(&self) -> BodyId {
        BodyId(self.bodies.len())
    }

    fn add_sun(&mut self, record: &BodyRecord) {
        let id = self.next_id();
        self.bodies.push(Body {
            id,
            name: record.display_name().to_string(),
            kind: BodyKind::Star,
            radius: record.mean_radius * self.config.size_scale,
            color: SUN_COLOR,
            orbit_color: SUN_COLOR,
            elements: None,
            orbit: None,
            position: Point3::origin(),
            highlighted: false,
        });
    }

    fn add_orbiting(&mut self, record: &BodyRecord, is_pluto: bool) -> Option<BodyId> {
        let name = record.display_name().to_string();
        let elements = match record.elements() {
            Some(elements) => elements.scaled(self.config.distance_scale),
            None => {
                log::warn!("Skipping {}: no orbital elements", name);
                return None;
            }
        };
        let orbit = match sample(&elements, self.config.orbit_points) {
            Ok(orbit) => orbit,
            Err(e) => {
                log::warn!("Skipping {}: {}", name, e);
                return None;
            }
        };

        let position = if elements.orbital_period.is_some() {
            position_at(&elements, 0.0, &self.settings).unwrap_or_else(|e| {
                log::warn!("{}: {}; starting at periapsis", name, e);
                orbit.samples()[0]
            })
        } else {
            orbit.samples()[0]
        };

        let orbit_hex = if is_pluto { self.config.pluto_orbit_color } else { self.config.orbit_color };
        let radius = record.mean_radius * self.config.size_scale;
        let id = self.next_id();
        self.bodies.push(Body {
            id,
            color: self.config.body_color(&name),
            orbit_color: mix_towards_white(hex_to_rgb(orbit_hex), ORBIT_WHITE_MIX),
            name,
            kind: BodyKind::Planet,
            radius,
            elements: Some(elements),
            orbit: Some(orbit),
            position,
            highlighted: false,
        });

        let count = record.moon_count();
        for (index, moon) in record.moons.iter().flatten().enumerate() {
            let moon_id = self.next_id();
            self.bodies.push(Body {
                id: moon_id,
                name: moon.moon.clone(),
                kind: BodyKind::Moon { parent: id, index, count },
                radius: radius * 0.1,
                color: MOON_COLOR,
                orbit_color: MOON_COLOR,
                elements: None,
                orbit: None,
                position: position + moon_offset(radius, index, count),
                highlighted: false,
            });
        }

        Some(id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn selected(&self) -> Option<BodyId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<BodyId> {
        self.hovered
    }

    pub fn following(&self) -> Option<BodyId> {
        self.follow
    }

    pub fn is_flying(&self) -> bool {
        self.fly.is_some()
    }

    pub fn halos_enabled(&self) -> bool {
        self.halos_enabled
    }

    pub fn info_visible(&self) -> bool {
        self.info_visible
    }

    pub fn info_text(&self) -> &str {
        &self.info_text
    }

    /// Advance the clock and move every body to its position at the new
    /// simulation time. A body whose Kepler solve fails keeps last frame's
    /// position.
    pub fn update(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        let time = self.clock.tick(now_ms);

        for body in &mut self.bodies {
            let Some(elements) = &body.elements else { continue };
            if elements.orbital_period.is_none() {
                continue;
            }
            match position_at(elements, time, &self.settings) {
                Ok(position) => body.position = position,
                Err(e) => log::warn!("Skipping {} this frame: {}", body.name, e),
            }
        }

        for i in 0..self.bodies.len() {
            if let BodyKind::Moon { parent, index, count } = self.bodies[i].kind {
                let planet = &self.bodies[parent.0];
                let position = planet.position + moon_offset(planet.radius, index, count);
                self.bodies[i].position = position;
            }
        }

        self.update_camera(now_ms);
    }

    fn update_camera(&mut self, now_ms: f64) {
        let follow_target = self.follow.and_then(|id| self.body(id)).map(|b| b.position);
        if let Some(fly) = &mut self.fly {
            // The body keeps moving during the flight
            if let Some(target) = follow_target {
                fly.retarget(target);
            }
            if !fly.is_finished(now_ms) {
                return;
            }
            let end = fly.end();
            let target = fly.target();
            self.camera.set_from_eye(end.eye, target);
            self.fly = None;
        }
        if let Some(target) = follow_target {
            self.camera.target = target;
        }
    }

    /// Camera pose for the current frame, mid-flight when a fly-to is active.
    pub fn camera_pose(&self) -> CameraPose {
        match &self.fly {
            Some(fly) => fly.pose_at(self.now_ms),
            None => self.camera.pose(),
        }
    }

    fn pick_radius(&self, body: &Body) -> f64 {
        let scale = if self.halos_enabled { self.config.halo_scale } else { 1.0 };
        body.radius * scale
    }

    /// Body under the NDC point, nearest first.
    pub fn pick_at(&self, ndc_x: f32, ndc_y: f32, aspect: f32) -> Option<BodyId> {
        let ray = Ray::from_camera(
            &self.camera_pose(),
            self.camera.fov,
            f64::from(aspect),
            f64::from(ndc_x),
            f64::from(ndc_y),
        );
        pick(
            &ray,
            self.bodies
                .iter()
                .map(|b| (b.id, b.position, self.pick_radius(b))),
        )
    }

    pub fn handle_click(&mut self, ndc_x: f32, ndc_y: f32, aspect: f32) -> Option<BodyId> {
        match self.pick_at(ndc_x, ndc_y, aspect) {
            Some(id) => {
                self.select(id);
                Some(id)
            }
            None => {
                log::debug!("Nothing clicked");
                None
            }
        }
    }

    /// Show the body in the info panel and fly the camera to it.
    pub fn select(&mut self, id: BodyId) {
        let Some(body) = self.body(id) else { return };
        let target = body.position;
        let radius = body.radius;
        let info_text = self.config.display_name(&body.name).to_string();
        log::info!("Clicked on: {}", body.name);

        self.info_text = info_text;
        self.fly = Some(FlyTo::new(
            self.camera_pose(),
            target,
            radius,
            self.now_ms,
            self.config.fly_to_duration_ms,
        ));
        self.selected = Some(id);
        self.follow = Some(id);
    }

    pub fn handle_hover(&mut self, ndc_x: f32, ndc_y: f32, aspect: f32) {
        let hit = self.pick_at(ndc_x, ndc_y, aspect);
        self.set_hovered(hit);
    }

    pub fn clear_hover(&mut self) {
        self.set_hovered(None);
    }

    fn set_hovered(&mut self, hit: Option<BodyId>) {
        if hit == self.hovered {
            return;
        }
        if let Some(old) = self.hovered {
            self.set_highlighted(old, false);
        }
        if let Some(new) = hit {
            self.set_highlighted(new, true);
        }
        self.hovered = hit;
    }

    pub fn set_highlighted(&mut self, id: BodyId, highlighted: bool) {
        if let Some(body) = self.bodies.get_mut(id.0) {
            body.highlighted = highlighted;
        }
    }

    pub fn toggle_info(&mut self) -> bool {
        self.info_visible = !self.info_visible;
        self.info_visible
    }

    pub fn toggle_halos(&mut self) -> bool {
        self.halos_enabled = !self.halos_enabled;
        self.halos_enabled
    }

    pub fn release_follow(&mut self) {
        self.follow = None;
    }

    /// Drag rotation. Ignored while flying.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if self.fly.is_none() {
            self.camera.rotate(f64::from(-dx) * 0.01, f64::from(-dy) * 0.01);
        }
    }

    pub fn zoom(&mut self, delta: f32) {
        if self.fly.is_none() {
            self.camera.zoom(f64::from(delta));
        }
    }

    /// Keyboard shortcuts. Returns whether the key was used.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "ArrowLeft" => self.rotate(-10.0, 0.0),
            "ArrowRight" => self.rotate(10.0, 0.0),
            "ArrowUp" => self.rotate(0.0, -10.0),
            "ArrowDown" => self.rotate(0.0, 10.0),
            "+" | "=" => self.clock.set_speed(self.clock.speed() * 2.0),
            "-" => self.clock.set_speed(self.clock.speed() / 2.0),
            " " => {
                self.clock.toggle_pause();
            }
            "Escape" => self.release_follow(),
            "i" | "I" => {
                self.toggle_info();
            }
            "h" | "H" => {
                self.toggle_halos();
            }
            _ => return false,
        }
        true
    }
}
