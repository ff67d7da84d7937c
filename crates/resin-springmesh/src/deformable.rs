//! Building a simulation from a render mesh and driving the mesh from it.
//!
//! Setup creates one point per render vertex (in world space), three
//! connections per triangle, and the vertex binding table. After that the
//! point and connection counts never change.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_springmesh::{
//!     CpuDeformer, DeformableMesh, MeshSetup, RenderMesh, SimulationConfig,
//! };
//! use glam::{Affine3A, Vec3};
//!
//! let mesh = RenderMesh::new(
//!     vec![Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 1.0)],
//!     vec![0, 2, 1],
//! );
//! let mut body = DeformableMesh::new(mesh, Affine3A::IDENTITY, &MeshSetup::default()).unwrap();
//!
//! let config = SimulationConfig::default();
//! for _ in 0..10 {
//!     body.step(&config, 1.0 / 60.0);
//! }
//! body.deform(&mut CpuDeformer::new()).unwrap();
//! assert!(body.mesh().positions[0].y < 1.0);
//! ```

use glam::{Affine3A, Vec3};
use tracing::debug;

use crate::binding::{WeightedBinding, compute_bindings};
use crate::config::{MeshSetup, RestLength, SimulationConfig};
use crate::connection::ConnectionParams;
use crate::deform::{Aabb, DeformBackend, RenderMesh};
use crate::error::{DeformResult, SetupError, SetupResult};
use crate::point::Point;
use crate::world::{SpringMesh, TickReport};

/// A render mesh bound to a mass-spring simulation.
#[derive(Debug, Clone)]
pub struct DeformableMesh {
    mesh: RenderMesh,
    local_to_world: Affine3A,
    world_to_local: Affine3A,
    simulation: SpringMesh,
    bindings: Vec<WeightedBinding>,
    bounds: Option<Aabb>,
    scratch: Vec<Vec3>,
}

impl DeformableMesh {
    /// Builds the simulation and binding table for `mesh`.
    pub fn new(mesh: RenderMesh, local_to_world: Affine3A, setup: &MeshSetup) -> SetupResult<Self> {
        validate_triangles(&mesh)?;
        let world_to_local = invert(&local_to_world)?;

        let world: Vec<Vec3> = mesh
            .positions
            .iter()
            .map(|&p| local_to_world.transform_point3(p))
            .collect();

        let simulation = build_simulation(&world, &mesh, setup)?;
        let bindings = compute_bindings(&world, &simulation.positions());
        debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            connections = simulation.connection_count(),
            "bound render mesh to spring simulation"
        );

        let bounds = mesh.bounds();
        Ok(Self {
            mesh,
            local_to_world,
            world_to_local,
            simulation,
            bindings,
            bounds,
            scratch: Vec::new(),
        })
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self, config: &SimulationConfig, dt: f32) -> TickReport {
        self.simulation.tick(config, dt)
    }

    /// Recomputes render vertices from the current point positions, then
    /// refreshes normals and bounds.
    ///
    /// On error the render mesh is left unchanged.
    pub fn deform<B: DeformBackend>(&mut self, backend: &mut B) -> DeformResult<()> {
        let points = self.simulation.positions();
        backend.deform(
            &points,
            &self.bindings,
            &self.world_to_local,
            &mut self.scratch,
        )?;
        std::mem::swap(&mut self.mesh.positions, &mut self.scratch);
        self.mesh.recompute_normals();
        self.bounds = self.mesh.bounds();
        Ok(())
    }

    /// The render mesh as of the last deformation.
    pub fn mesh(&self) -> &RenderMesh {
        &self.mesh
    }

    /// Bounds of the render mesh as of the last deformation.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// The binding table, one entry per render vertex.
    pub fn bindings(&self) -> &[WeightedBinding] {
        &self.bindings
    }

    /// The underlying simulation.
    pub fn simulation(&self) -> &SpringMesh {
        &self.simulation
    }

    /// Mutable access to the simulation, e.g. to fix points.
    pub fn simulation_mut(&mut self) -> &mut SpringMesh {
        &mut self.simulation
    }

    /// Object transform used at setup.
    pub fn local_to_world(&self) -> Affine3A {
        self.local_to_world
    }
}

fn validate_triangles(mesh: &RenderMesh) -> SetupResult<()> {
    if mesh.indices.len() % 3 != 0 {
        return Err(SetupError::MalformedTriangles(mesh.indices.len()));
    }
    let count = mesh.vertex_count();
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= count) {
        return Err(SetupError::PointOutOfBounds {
            index: index as usize,
            count,
        });
    }
    Ok(())
}

fn invert(local_to_world: &Affine3A) -> SetupResult<Affine3A> {
    let det = local_to_world.matrix3.determinant();
    if !(local_to_world.is_finite() && det.is_finite() && det != 0.0) {
        return Err(SetupError::SingularTransform(det));
    }
    Ok(local_to_world.inverse())
}

fn build_simulation(
    world: &[Vec3],
    mesh: &RenderMesh,
    setup: &MeshSetup,
) -> SetupResult<SpringMesh> {
    let mut simulation = SpringMesh::with_capacity(world.len(), mesh.triangle_count() * 3);
    for &position in world {
        simulation.add_point(Point::with_defaults(position, &setup.point));
    }

    let defaults = setup.connection;
    for [a, b, c] in mesh.triangles() {
        for (from, to) in [(a, b), (b, c), (c, a)] {
            let rest_length = match defaults.rest_length {
                RestLength::Fixed(length) => length,
                RestLength::FromGeometry => {
                    let length = (world[to] - world[from]).length();
                    if !(length > 0.0) {
                        return Err(SetupError::DegenerateEdge { a: from, b: to });
                    }
                    length
                }
            };
            let params = ConnectionParams::new(
                rest_length,
                defaults.spring_constant,
                defaults.damper_constant,
            );
            simulation.add_connection(from, to, params)?;
        }
    }
    Ok(simulation)
}
