//! Mass-spring surface simulation and render mesh skinning.
//!
//! A [`SpringMesh`] holds point masses joined by damped springs. Each tick
//! applies gravity and spring forces, resolves a ground plane, integrates
//! with speed and position limits, and optionally clamps connection lengths
//! to a band around their rest length.
//!
//! A [`DeformableMesh`] builds such a simulation from a triangle mesh (one
//! point per vertex, three connections per triangle) and binds every render
//! vertex to its three nearest points, so the mesh follows the simulation.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_springmesh::{ConnectionParams, Point, SimulationConfig, SpringMesh};
//! use glam::Vec3;
//!
//! // A short rope hanging from its first point
//! let mut rope = SpringMesh::new();
//! for i in 0..8 {
//!     rope.add_point(Point::new(Vec3::new(i as f32, 5.0, 0.0), 1.0));
//! }
//! for i in 0..7 {
//!     rope.add_connection(i, i + 1, ConnectionParams::default()).unwrap();
//! }
//! rope.fix_points(&[0]);
//!
//! let config = SimulationConfig::default();
//! let report = rope.ticks(&config, 1.0 / 60.0, 120);
//!
//! assert!(!report.absorbed_instability());
//! assert_eq!(rope.points()[0].position, Vec3::new(0.0, 5.0, 0.0));
//! assert!(rope.points()[7].position.y < 5.0);
//! ```
//!
//! # Features
//!
//! - `parallel` (default): per-point and per-connection passes run on rayon.
//! - `serde`: serialization for configuration types.

pub mod binding;
pub mod collision;
pub mod config;
pub mod connection;
pub mod deform;
pub mod deformable;
pub mod dispatch;
pub mod error;
pub mod forces;
pub mod integrate;
pub mod point;
pub mod surface;
pub mod world;

pub use binding::{
    BINDING_SLOTS, WEIGHT_EPSILON, WeightedBinding, WeightedPoint, bind_vertex, compute_bindings,
};
pub use config::{
    ConnectionDefaults, ForceScatter, GravityConfig, GroundConfig, MeshSetup, PointDefaults,
    RestLength, SimulationConfig, SurfaceBoundConfig,
};
pub use connection::{Connection, ConnectionParams, ConnectionWaves, Incidence};
pub use deform::{Aabb, CpuDeformer, DeformBackend, RenderMesh};
pub use deformable::DeformableMesh;
pub use error::{DeformError, DeformResult, SetupError, SetupResult};
pub use integrate::{
    IntegrationOutcome, IntegrationStats, MAX_POSITION, MAX_SPEED, VELOCITY_RETENTION,
};
pub use point::Point;
pub use world::{SpringMesh, TickReport};
