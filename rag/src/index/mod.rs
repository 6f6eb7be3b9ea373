//! Exact nearest-neighbor index.
//!
//! [`FlatIndex`] scans every stored vector on each query. There is no approximate structure to
//! tune, so recall is always exact.

mod flat;

pub use flat::FlatIndex;

/// Squared Euclidean distance between two vectors of equal length.
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(lhs, rhs)| {
            let diff = lhs - rhs;
            diff * diff
        })
        .sum()
}
