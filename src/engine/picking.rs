//! Pointer picking against body spheres.

use nalgebra::{Point3, Vector3};

use crate::engine::camera::CameraPose;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    /// Unit length
    pub direction: Vector3<f64>,
}

/// Client pixel coordinates to normalized device coordinates (y up).
pub fn client_to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    (x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

impl Ray {
    /// Ray from the camera eye through an NDC point of a perspective view
    /// with vertical field of view `fov`.
    pub fn from_camera(pose: &CameraPose, fov: f64, aspect: f64, ndc_x: f64, ndc_y: f64) -> Self {
        let half_height = (fov / 2.0).tan();
        let local = Vector3::new(ndc_x * half_height * aspect, ndc_y * half_height, -1.0);
        Ray {
            origin: pose.eye,
            direction: (pose.orientation * local).normalize(),
        }
    }

    /// Distance along the ray to the first hit on the sphere, if any.
    pub fn intersect_sphere(&self, center: &Point3<f64>, radius: f64) -> Option<f64> {
        let to_center = center - self.origin;
        let along = to_center.dot(&self.direction);
        let closest_sq = to_center.norm_squared() - along * along;
        let radius_sq = radius * radius;
        if closest_sq > radius_sq {
            return None;
        }
        let half_chord = (radius_sq - closest_sq).sqrt();
        let near = along - half_chord;
        let far = along + half_chord;
        if far < 0.0 {
            None
        } else if near < 0.0 {
            Some(0.0)
        } else {
            Some(near)
        }
    }
}

/// Nearest candidate hit by `ray`. Candidates are `(id, center, radius)`.
pub fn pick<I, T>(ray: &Ray, candidates: I) -> Option<T>
where
    I: IntoIterator<Item = (T, Point3<f64>, f64)>,
{
    candidates
        .into_iter()
        .filter_map(|(id, center, radius)| ray.intersect_sphere(&center, radius).map(|d| (id, d)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::camera::OrbitCamera;
    use std::f64::consts::FRAC_PI_2;

    fn ray_down_z() -> Ray {
        Ray {
            origin: Point3::new(0.0, 0.0, 100.0),
            direction: -Vector3::z(),
        }
    }

    #[test]
    fn test_client_to_ndc() {
        assert_eq!(client_to_ndc(0.0, 0.0, 800.0, 600.0), (-1.0, 1.0));
        assert_eq!(client_to_ndc(400.0, 300.0, 800.0, 600.0), (0.0, 0.0));
        assert_eq!(client_to_ndc(800.0, 600.0, 800.0, 600.0), (1.0, -1.0));
    }

    #[test]
    fn test_sphere_hit_and_miss() {
        let ray = ray_down_z();
        let hit = ray.intersect_sphere(&Point3::new(0.0, 0.0, 0.0), 2.0).unwrap();
        assert!((hit - 98.0).abs() < 1e-9);
        assert!(ray.intersect_sphere(&Point3::new(5.0, 0.0, 0.0), 2.0).is_none());
        // behind the origin
        assert!(ray.intersect_sphere(&Point3::new(0.0, 0.0, 200.0), 2.0).is_none());
        // origin inside the sphere
        assert_eq!(ray.intersect_sphere(&Point3::new(0.0, 0.0, 100.0), 2.0), Some(0.0));
    }

    #[test]
    fn test_pick_nearest() {
        let ray = ray_down_z();
        let candidates = vec![
            ("far", Point3::new(0.0, 0.0, -50.0), 3.0),
            ("near", Point3::new(0.0, 0.0, 20.0), 1.0),
            ("off", Point3::new(30.0, 0.0, 50.0), 1.0),
        ];
        assert_eq!(pick(&ray, candidates), Some("near"));
        assert_eq!(pick(&ray, Vec::<(u32, Point3<f64>, f64)>::new()), None);
    }

    #[test]
    fn test_center_of_screen_ray_follows_camera() {
        let camera = OrbitCamera::new(100.0);
        let pose = camera.pose();
        let ray = Ray::from_camera(&pose, camera.fov, 1.5, 0.0, 0.0);
        assert!((ray.direction - pose.forward()).norm() < 1e-9);
        assert!(ray.intersect_sphere(&Point3::origin(), 1.0).is_some());
    }

    #[test]
    fn test_pick_small_body_far_from_origin() {
        let center = Point3::new(-3_183_752.8, 4_921_044.3, 1_250_112.6);
        let pose = CameraPose::look_at(center + Vector3::new(0.0, 0.0, 0.6), center);
        let fov = 75.0_f64.to_radians();
        // 0.1 NDC off centre is ~0.046 units sideways at the body
        let hit = Ray::from_camera(&pose, fov, 1.0, 0.1, 0.0);
        assert!(hit.intersect_sphere(&center, 0.119).is_some());
        let miss = Ray::from_camera(&pose, fov, 1.0, 0.5, 0.0);
        assert!(miss.intersect_sphere(&center, 0.119).is_none());
    }

    #[test]
    fn test_screen_edge_ray_spans_field_of_view() {
        let pose = CameraPose::look_at(Point3::new(0.0, 0.0, 10.0), Point3::origin());
        let ray = Ray::from_camera(&pose, FRAC_PI_2, 1.0, 0.0, 1.0);
        // 90° vertical field of view: the top edge leaves at 45°
        let expected = Vector3::new(0.0, 1.0, -1.0).normalize();
        assert!((ray.direction - expected).norm() < 1e-9);
        assert!(ray.intersect_sphere(&Point3::new(0.0, 10.0, 0.0), 0.5).is_some());
    }
}
