//! Layer slicing for the lamina pipeline
//!
//! Three pieces live here: the z schedule (which horizontal planes get cut),
//! the plane/mesh intersection that turns triangles into a planar edge soup
//! ([`CrossSection`]), and the contour builder that stitches that soup back
//! into polygons with holes.

mod contour;
mod schedule;
mod section;

pub use contour::build_contours;
pub use schedule::{LayerSchedule, ScheduleError};
pub use section::CrossSection;
