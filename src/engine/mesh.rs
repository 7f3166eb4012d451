use std::f32::consts::PI;

/// Floats per vertex: position xyz followed by normal xyz.
pub const VERTEX_STRIDE: usize = 6;

pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Unit-radius UV sphere centred on the origin.
    ///
    /// `segments` splits the equator, `rings` splits pole to pole.
    pub fn sphere(segments: u16, rings: u16) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity((segments as usize + 1) * (rings as usize + 1) * VERTEX_STRIDE);
        let mut indices = Vec::with_capacity(segments as usize * rings as usize * 6);

        for ring in 0..=rings {
            let polar = ring as f32 / rings as f32 * PI;
            let (sin_p, cos_p) = polar.sin_cos();
            for seg in 0..=segments {
                let azimuth = seg as f32 / segments as f32 * 2.0 * PI;
                let (sin_a, cos_a) = azimuth.sin_cos();
                let (x, y, z) = (sin_p * cos_a, cos_p, sin_p * sin_a);
                vertices.extend_from_slice(&[x, y, z, x, y, z]);
            }
        }

        let row = segments + 1;
        for ring in 0..rings {
            for seg in 0..segments {
                let top = ring * row + seg;
                let bottom = top + row;
                indices.extend_from_slice(&[
                    top, bottom, top + 1,
                    top + 1, bottom, bottom + 1,
                ]);
            }
        }

        Mesh { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_on_unit_sphere() {
        let mesh = Mesh::sphere(16, 8);
        assert_eq!(mesh.vertex_count(), 17 * 9);
        for v in mesh.vertices.chunks(VERTEX_STRIDE) {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
            // outward normal
            assert_eq!(&v[3..], &v[..3]);
        }
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let mesh = Mesh::sphere(32, 32);
        assert_eq!(mesh.indices.len(), 32 * 32 * 6);
        let count = mesh.vertex_count() as u16;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }
}
