use tidewater_common::{MeshHandle, Vertex};

use crate::wave::WaveField;

/// Destination that makes CPU-written vertices visible to the GPU copy of a mesh.
///
/// Called once per deformation pass, after the last vertex is written and
/// before any draw of `mesh` is issued in the same frame.
pub trait VertexUpload {
    fn upload_vertices(&mut self, mesh: MeshHandle, vertices: &[Vertex]);
}

/// Summary of one deformation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeformStats {
    pub vertices: usize,
    pub min_y: i16,
    pub max_y: i16,
}

/// Applies the wave field to every vertex of a mesh in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshMutator {
    field: WaveField,
}

impl MeshMutator {
    pub fn new(field: WaveField) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    /// Rewrite `y` and color of every vertex from its x/z at `phase`.
    ///
    /// x and z are never written, so repeated passes read the same reference
    /// coordinates; y is scratch and fully overwritten.
    pub fn deform_in_place(&self, vertices: &mut [Vertex], phase: f32) -> DeformStats {
        let global = self.field.global_height(phase);
        let mut stats = DeformStats {
            vertices: vertices.len(),
            min_y: i16::MAX,
            max_y: i16::MIN,
        };

        for v in vertices.iter_mut() {
            let sample =
                self.field
                    .sample_with_global(v.x() as f32, v.z() as f32, phase, global);
            let y = sample.height_fixed();
            v.position[1] = y;
            v.color = sample.color();
            stats.min_y = stats.min_y.min(y);
            stats.max_y = stats.max_y.max(y);
        }

        if vertices.is_empty() {
            stats = DeformStats::default();
        }
        stats
    }

    /// Deform, then upload the whole range to `upload`. Empty meshes are a no-op.
    pub fn deform<U>(
        &self,
        mesh: MeshHandle,
        vertices: &mut [Vertex],
        phase: f32,
        upload: &mut U,
    ) -> DeformStats
    where
        U: VertexUpload + ?Sized,
    {
        if vertices.is_empty() {
            return DeformStats::default();
        }
        let stats = self.deform_in_place(vertices, phase);
        upload.upload_vertices(mesh, vertices);
        tracing::trace!(
            mesh = mesh.0,
            vertices = stats.vertices,
            min_y = stats.min_y,
            max_y = stats.max_y,
            "mesh deformed"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_common::Rgba;

    #[derive(Default)]
    struct CapturingUpload {
        uploads: Vec<(MeshHandle, Vec<Vertex>)>,
    }

    impl VertexUpload for CapturingUpload {
        fn upload_vertices(&mut self, mesh: MeshHandle, vertices: &[Vertex]) {
            self.uploads.push((mesh, vertices.to_vec()));
        }
    }

    fn grid(n: i16) -> Vec<Vertex> {
        let mut verts = Vec::new();
        for z in 0..n {
            for x in 0..n {
                verts.push(Vertex::new(
                    [x * 8 - 20, 999, z * 8 - 20],
                    [0, 127, 0],
                    Rgba::WHITE,
                    [0, 0],
                ));
            }
        }
        verts
    }

    #[test]
    fn deform_writes_height_and_shade_only() {
        let mutator = MeshMutator::default();
        let mut verts = grid(6);
        let before = verts.clone();
        mutator.deform_in_place(&mut verts, 0.7);

        for (old, new) in before.iter().zip(&verts) {
            assert_eq!(old.x(), new.x());
            assert_eq!(old.z(), new.z());
            assert_eq!(old.normal, new.normal);
            assert_eq!(old.uv, new.uv);
            let s = mutator.field().sample(old.x() as f32, old.z() as f32, 0.7);
            assert_eq!(new.y(), s.height_fixed());
            assert_eq!(new.color, s.color());
            assert_eq!(new.color.a(), 0xFF);
        }
    }

    #[test]
    fn phase_zero_origin_vertex() {
        let mutator = MeshMutator::default();
        let mut verts = vec![Vertex::new([0, 123, 0], [0, 127, 0], Rgba::BLACK, [0, 0])];
        let stats = mutator.deform_in_place(&mut verts, 0.0);
        assert_eq!(verts[0].y(), 0);
        assert_eq!(verts[0].color, Rgba::gray(191));
        assert_eq!(stats, DeformStats { vertices: 1, min_y: 0, max_y: 0 });
    }

    #[test]
    fn repeated_pass_at_same_phase_is_stable() {
        let mutator = MeshMutator::default();
        let mut verts = grid(5);
        mutator.deform_in_place(&mut verts, 2.0);
        let first = verts.clone();
        mutator.deform_in_place(&mut verts, 2.0);
        assert_eq!(first, verts);
    }

    #[test]
    fn upload_sees_the_finished_pass() {
        let mutator = MeshMutator::default();
        let mut verts = grid(4);
        let mut upload = CapturingUpload::default();
        let stats = mutator.deform(MeshHandle(3), &mut verts, 1.5, &mut upload);

        assert_eq!(upload.uploads.len(), 1);
        assert_eq!(upload.uploads[0].0, MeshHandle(3));
        assert_eq!(upload.uploads[0].1, verts);
        assert_eq!(stats.vertices, 16);
        assert!(stats.min_y <= stats.max_y);
        // |50 * local + 30 * global| stays within 80.
        assert!(stats.min_y >= -80 && stats.max_y <= 80);
    }

    #[test]
    fn empty_mesh_is_a_no_op() {
        let mutator = MeshMutator::default();
        let mut upload = CapturingUpload::default();
        let stats = mutator.deform(MeshHandle(0), &mut [], 1.0, &mut upload);
        assert_eq!(stats, DeformStats::default());
        assert!(upload.uploads.is_empty());
    }
}
