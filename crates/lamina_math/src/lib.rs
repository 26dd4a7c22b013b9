//! Math primitives for the lamina slicer
//!
//! This crate provides the 2D/3D vector types, the planar bounding box, and
//! the numeric tolerances shared by every stage of the slicing pipeline.

mod vec2;
mod vec3;
mod aabb;

pub use vec2::Vec2;
pub use vec3::Vec3;
pub use aabb::Aabb2;

/// Signed-distance tolerance for the slicing-plane test.
///
/// A vertex whose distance to the plane is below this is treated as lying
/// exactly on the plane; edge crossings use a strict sign change so that
/// on-plane vertices are never counted twice.
pub const PLANE_EPS: f64 = 1e-9;

/// Clipped infill pieces shorter than this are discarded as degenerate.
pub const MIN_SEGMENT_LENGTH: f64 = 1e-12;

/// The topmost slicing plane sits this far below the model's maximum z so it
/// never lands exactly on the top face.
pub const TOP_CLAMP: f64 = 1e-5;

/// Number of decimal places used when keying vertices for deduplication.
pub const DEDUP_DECIMALS: i32 = 9;

/// Quantize a coordinate to the 9-decimal deduplication grid.
///
/// Two coordinates that agree after rounding to [`DEDUP_DECIMALS`] places map
/// to the same key and are unified by every vertex pool in the pipeline.
#[inline]
pub fn quantize(value: f64) -> i64 {
    (value * 1e9).round() as i64
}
