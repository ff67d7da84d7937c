//! Render mesh deformation from simulated point positions.
//!
//! A [`DeformBackend`] turns point positions and the binding table into
//! local-space render vertices. [`CpuDeformer`] is the reference; other
//! backends (compute shaders, etc.) are expected to match it within
//! floating tolerance.

use glam::{Affine3A, Vec3};

use crate::binding::WeightedBinding;
use crate::dispatch;
use crate::error::{DeformError, DeformResult};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point, or `None` if there are none.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// Centre of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Indexed triangle mesh being driven by the simulation.
#[derive(Debug, Clone, Default)]
pub struct RenderMesh {
    /// Vertex positions in local space.
    pub positions: Vec<Vec3>,
    /// Vertex normals (per-vertex).
    pub normals: Vec<Vec3>,
    /// Triangle indices (every 3 indices form a triangle).
    pub indices: Vec<u32>,
}

impl RenderMesh {
    /// Creates a mesh from positions and triangle indices, with smooth normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mut mesh = Self {
            positions,
            normals: Vec::new(),
            indices,
        };
        mesh.recompute_normals();
        mesh
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates triangles as vertex index triples.
    ///
    /// A trailing partial triangle is ignored.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    /// Recomputes smooth area-weighted normals.
    ///
    /// Triangles referencing missing vertices are skipped.
    pub fn recompute_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), Vec3::ZERO);

        let count = self.positions.len();
        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if i0 >= count || i1 >= count || i2 >= count {
                continue;
            }
            let v0 = self.positions[i0];
            let normal = (self.positions[i1] - v0).cross(self.positions[i2] - v0);
            self.normals[i0] += normal;
            self.normals[i1] += normal;
            self.normals[i2] += normal;
        }

        for normal in &mut self.normals {
            *normal = normal.normalize_or_zero();
        }
    }

    /// Bounds of the current positions.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }
}

/// Computes deformed render vertices from point positions and bindings.
pub trait DeformBackend {
    /// Writes one local-space position per binding into `out`.
    ///
    /// Each vertex is the weighted sum of its bound point positions
    /// (world space) mapped through `world_to_local`.
    fn deform(
        &mut self,
        points: &[Vec3],
        bindings: &[WeightedBinding],
        world_to_local: &Affine3A,
        out: &mut Vec<Vec3>,
    ) -> DeformResult<()>;
}

/// Reference CPU implementation of [`DeformBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuDeformer;

impl CpuDeformer {
    /// Creates a CPU deformer.
    pub fn new() -> Self {
        Self
    }
}

impl DeformBackend for CpuDeformer {
    fn deform(
        &mut self,
        points: &[Vec3],
        bindings: &[WeightedBinding],
        world_to_local: &Affine3A,
        out: &mut Vec<Vec3>,
    ) -> DeformResult<()> {
        let blended = dispatch::map(bindings, |binding| binding.blend(points));

        out.clear();
        out.reserve(blended.len());
        for (vertex, position) in blended.into_iter().enumerate() {
            let Some(world) = position else {
                let index = bindings[vertex]
                    .slots
                    .iter()
                    .map(|s| s.index)
                    .find(|&i| i >= 0 && i as usize >= points.len())
                    .unwrap_or(-1);
                return Err(DeformError::BindingOutOfRange {
                    vertex,
                    index,
                    count: points.len(),
                });
            };
            out.push(world_to_local.transform_point3(world));
        }
        Ok(())
    }
}
