//! Concentric perimeter offsets
//!
//! Walls are Minkowski erosions of the layer polygon by a disk of radius
//! `(i + 0.5) * line_width`, so each printed line's centerline sits half a
//! line width inside the previous boundary. Erosion may split a polygon into
//! disjoint pieces or dissolve it entirely; both are normal outcomes.

use geo::{Area, MultiPolygon, Polygon};
use geo_buffer::buffer_polygon;
use log::debug;

/// Erode a polygon-with-holes inward by `distance`
///
/// Outer rings shrink, holes grow. Every surviving connected piece is
/// returned as its own polygon; an empty vector means the region dissolved.
pub fn erode(polygon: &Polygon<f64>, distance: f64) -> Vec<Polygon<f64>> {
    let result: MultiPolygon<f64> = buffer_polygon(polygon, -distance);
    result
        .into_iter()
        .filter(|piece| piece.unsigned_area() > 0.0)
        .collect()
}

/// The innermost region left for infill after all walls are printed
///
/// Erodes each polygon by `line_width * (wall_count + 0.5)` and drops the
/// pieces that dissolve.
pub fn interior_region(
    polygons: &[Polygon<f64>],
    line_width: f64,
    wall_count: usize,
) -> Vec<Polygon<f64>> {
    let distance = line_width * (wall_count as f64 + 0.5);
    polygons
        .iter()
        .flat_map(|polygon| erode(polygon, distance))
        .collect()
}

/// One concentric wall: all pieces at a single centerline offset
#[derive(Debug, Clone)]
pub struct Wall {
    /// Centerline distance from the source polygon boundary
    pub offset: f64,
    /// Connected pieces of the eroded region
    pub pieces: Vec<Polygon<f64>>,
}

/// The concentric walls of one polygon-with-holes, outermost first
///
/// Walls whose erosion comes back empty are omitted.
#[derive(Debug, Clone, Default)]
pub struct PerimeterSet {
    pub walls: Vec<Wall>,
}

impl PerimeterSet {
    /// Build `wall_count` inward offsets of `polygon`
    pub fn build(polygon: &Polygon<f64>, line_width: f64, wall_count: usize) -> Self {
        let mut walls = Vec::new();
        for i in 0..wall_count {
            let offset = (i as f64 + 0.5) * line_width;
            let pieces = erode(polygon, offset);
            if pieces.is_empty() {
                debug!("wall {} at offset {} dissolved", i, offset);
                continue;
            }
            walls.push(Wall { offset, pieces });
        }
        Self { walls }
    }

    /// All wall pieces in order, outermost wall first
    pub fn flattened(&self) -> Vec<Polygon<f64>> {
        self.walls
            .iter()
            .flat_map(|wall| wall.pieces.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Contains, LineString};

    fn square(origin: (f64, f64), size: f64) -> Polygon<f64> {
        let (x, y) = origin;
        Polygon::new(
            LineString::from(vec![
                (x, y),
                (x + size, y),
                (x + size, y + size),
                (x, y + size),
            ]),
            vec![],
        )
    }

    fn square_with_hole(size: f64, hole_size: f64) -> Polygon<f64> {
        let margin = (size - hole_size) / 2.0;
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)]),
            vec![LineString::from(vec![
                (margin, margin),
                (margin, margin + hole_size),
                (margin + hole_size, margin + hole_size),
                (margin + hole_size, margin),
            ])],
        )
    }

    #[test]
    fn test_erode_square() {
        let pieces = erode(&square((0.0, 0.0), 20.0), 0.25);
        assert_eq!(pieces.len(), 1);
        // Side shrinks from 20 to 19.5
        assert!((pieces[0].unsigned_area() - 19.5 * 19.5).abs() < 1e-6);
    }

    #[test]
    fn test_wall_offsets_match_centerline_radii() {
        let set = PerimeterSet::build(&square((0.0, 0.0), 20.0), 0.5, 2);
        assert_eq!(set.walls.len(), 2);
        assert_eq!(set.walls[0].offset, 0.25);
        assert_eq!(set.walls[1].offset, 0.75);
        assert!((set.walls[0].pieces[0].unsigned_area() - 19.5 * 19.5).abs() < 1e-6);
        assert!((set.walls[1].pieces[0].unsigned_area() - 18.5 * 18.5).abs() < 1e-6);
    }

    #[test]
    fn test_offset_area_never_grows() {
        let source = square_with_hole(20.0, 6.0);
        let source_area = source.unsigned_area();
        let set = PerimeterSet::build(&source, 0.5, 4);
        for wall in &set.walls {
            let area: f64 = wall.pieces.iter().map(|p| p.unsigned_area()).sum();
            assert!(area <= source_area + 1e-9);
        }
    }

    #[test]
    fn test_hole_grows_inward() {
        let pieces = erode(&square_with_hole(20.0, 10.0), 0.5);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].interiors().len(), 1);
        // Outer 19x19, hole 11x11
        assert!((pieces[0].unsigned_area() - (19.0 * 19.0 - 11.0 * 11.0)).abs() < 1e-6);
    }

    #[test]
    fn test_region_dissolves() {
        // Ring wall is 5 wide; eroding by 5 consumes everything
        let pieces = erode(&square_with_hole(20.0, 10.0), 5.0);
        assert!(pieces.is_empty());

        let set = PerimeterSet::build(&square((0.0, 0.0), 2.0), 0.5, 5);
        // Offsets 0.25 and 0.75 survive, 1.25 and beyond exceed the inradius
        assert!(set.walls.len() <= 2);
        assert!(!set.walls.is_empty());
    }

    #[test]
    fn test_narrow_neck_splits() {
        // Two 10x10 pads joined by a 0.4-wide neck; eroding by 0.5 severs it
        let dumbbell = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 4.8),
                (11.0, 4.8),
                (11.0, 0.0),
                (21.0, 0.0),
                (21.0, 10.0),
                (11.0, 10.0),
                (11.0, 5.2),
                (10.0, 5.2),
                (10.0, 10.0),
                (0.0, 10.0),
            ]),
            vec![],
        );
        let pieces = erode(&dumbbell, 0.5);
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn test_interior_region() {
        // line_width 0.5, 2 walls: interior boundary sits 1.25 inside
        let region = interior_region(&[square((0.0, 0.0), 20.0)], 0.5, 2);
        assert_eq!(region.len(), 1);
        assert!((region[0].unsigned_area() - 17.5 * 17.5).abs() < 1e-6);

        let inner = geo::Point::new(10.0, 10.0);
        assert!(region[0].contains(&inner));
        let near_edge = geo::Point::new(0.5, 10.0);
        assert!(!region[0].contains(&near_edge));
    }

    #[test]
    fn test_flattened_order() {
        let set = PerimeterSet::build(&square((0.0, 0.0), 20.0), 0.5, 3);
        let flat = set.flattened();
        assert_eq!(flat.len(), 3);
        // Outermost (largest) first
        assert!(flat[0].unsigned_area() > flat[1].unsigned_area());
        assert!(flat[1].unsigned_area() > flat[2].unsigned_area());
    }
}
