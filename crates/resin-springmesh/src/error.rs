//! Error types for spring mesh setup and deformation.
//!
//! Simulation ticks never fail; numeric trouble is absorbed per point.
//! Only construction and the deformation backend report errors.

use thiserror::Error;

/// Errors raised while building a spring mesh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    /// A connection or triangle referenced a point that does not exist.
    #[error("point index {index} out of bounds (count: {count})")]
    PointOutOfBounds {
        /// The offending index.
        index: usize,
        /// Number of points available.
        count: usize,
    },

    /// The triangle index list length is not a multiple of three.
    #[error("triangle index count {0} is not a multiple of 3")]
    MalformedTriangles(usize),

    /// Rest length must be positive and finite.
    #[error("invalid rest length {0}")]
    InvalidRestLength(f32),

    /// Spring and damper constants must be non-negative and finite.
    #[error("invalid spring parameters: spring {spring}, damper {damper}")]
    InvalidSpringParameters {
        /// Spring constant.
        spring: f32,
        /// Damper constant.
        damper: f32,
    },

    /// The object transform has no inverse, so deformed vertices cannot be
    /// mapped back into local space.
    #[error("object transform is not invertible (determinant {0})")]
    SingularTransform(f32),

    /// A mesh edge has zero length but rest lengths are taken from geometry.
    #[error("edge {a}-{b} has zero length")]
    DegenerateEdge {
        /// First vertex.
        a: usize,
        /// Second vertex.
        b: usize,
    },
}

/// Errors raised by a deformation backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeformError {
    /// A binding slot referenced a point outside the position buffer.
    #[error("binding for vertex {vertex} references point {index} of {count}")]
    BindingOutOfRange {
        /// Render vertex whose binding is invalid.
        vertex: usize,
        /// Point index stored in the slot.
        index: i32,
        /// Number of point positions supplied.
        count: usize,
    },

    /// Backend-specific failure (buffer upload, dispatch, readback).
    #[error("deformation backend failed: {0}")]
    Backend(String),
}

/// Result type for setup operations.
pub type SetupResult<T> = Result<T, SetupError>;

/// Result type for deformation operations.
pub type DeformResult<T> = Result<T, DeformError>;
