//! Render vertex to simulation point binding.
//!
//! Every render vertex is bound once, at setup, to its three nearest points
//! with normalized inverse squared distance weights. The table layout is
//! plain `#[repr(C)]` so a GPU backend can upload it as-is.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_springmesh::{compute_bindings, WeightedBinding};
//! use glam::Vec3;
//!
//! let points = [Vec3::ZERO, Vec3::X];
//! let bindings = compute_bindings(&[Vec3::new(0.25, 0.0, 0.0)], &points);
//!
//! assert_eq!(bindings[0].used_slots(), 2);
//! assert!((bindings[0].weight_sum() - 1.0).abs() < 1e-5);
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::dispatch;

/// Number of points each vertex is bound to.
pub const BINDING_SLOTS: usize = 3;

/// Added to squared distances so coincident points get a finite weight.
pub const WEIGHT_EPSILON: f32 = 1e-4;

/// One binding slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct WeightedPoint {
    /// Point index, or -1 for an unused slot.
    pub index: i32,
    /// Normalized weight, 0 for an unused slot.
    pub weight: f32,
}

impl WeightedPoint {
    /// An unused slot.
    pub const UNUSED: Self = Self {
        index: -1,
        weight: 0.0,
    };

    /// Returns the point index if this slot is used.
    pub fn point(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }
}

/// Up to three weighted points driving one render vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct WeightedBinding {
    /// Slots ordered nearest first.
    pub slots: [WeightedPoint; BINDING_SLOTS],
}

impl Default for WeightedBinding {
    fn default() -> Self {
        Self {
            slots: [WeightedPoint::UNUSED; BINDING_SLOTS],
        }
    }
}

impl WeightedBinding {
    /// Number of used slots.
    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.index >= 0).count()
    }

    /// Sum of all slot weights.
    pub fn weight_sum(&self) -> f32 {
        self.slots.iter().map(|s| s.weight).sum()
    }

    /// Weighted sum of the bound point positions.
    ///
    /// Returns `None` if a used slot references a point outside `positions`.
    pub fn blend(&self, positions: &[Vec3]) -> Option<Vec3> {
        let mut result = Vec3::ZERO;
        for slot in &self.slots {
            if let Some(i) = slot.point() {
                result += *positions.get(i)? * slot.weight;
            }
        }
        Some(result)
    }
}

/// Binds one vertex to its nearest points.
///
/// Ties in distance keep the lower point index first.
pub fn bind_vertex(vertex: Vec3, points: &[Vec3]) -> WeightedBinding {
    let mut nearest: [(usize, f32); BINDING_SLOTS] = [(usize::MAX, f32::INFINITY); BINDING_SLOTS];
    let mut found = 0;

    for (i, p) in points.iter().enumerate() {
        let dist_sq = (vertex - *p).length_squared();
        // Insertion into the sorted top-3; strict comparison keeps earlier
        // indices ahead on ties.
        let slot = nearest[..found]
            .iter()
            .position(|&(_, d)| dist_sq < d)
            .unwrap_or(found);
        if slot >= BINDING_SLOTS {
            continue;
        }
        let end = (found + 1).min(BINDING_SLOTS);
        for k in (slot + 1..end).rev() {
            nearest[k] = nearest[k - 1];
        }
        nearest[slot] = (i, dist_sq);
        found = end;
    }

    let mut binding = WeightedBinding::default();
    let mut total = 0.0;
    for (slot, &(index, dist_sq)) in binding.slots.iter_mut().zip(&nearest[..found]) {
        let weight = 1.0 / (dist_sq + WEIGHT_EPSILON);
        slot.index = index as i32;
        slot.weight = weight;
        total += weight;
    }

    for slot in &mut binding.slots[..found] {
        slot.weight = if total > 0.0 && total.is_finite() {
            slot.weight / total
        } else {
            0.0
        };
    }

    binding
}

/// Binds every vertex to its nearest points.
///
/// O(vertices * points); meant for setup, not per frame.
pub fn compute_bindings(vertices: &[Vec3], points: &[Vec3]) -> Vec<WeightedBinding> {
    dispatch::map(vertices, |&v| bind_vertex(v, points))
}
