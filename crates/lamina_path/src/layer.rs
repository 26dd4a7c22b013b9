//! Per-layer output record
//!
//! [`LayerPaths`] is what one layer hands to the downstream G-code emitter:
//! the perimeter polygons, the infill graph, and a merged vertex/edge view
//! combining both with deduplicated 3D coordinates.

use std::collections::HashMap;

use geo::{LineString, Polygon};
use lamina_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::InfillGraph;

/// The toolpath-ready deliverable for one layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerPaths {
    /// Height of the layer
    pub z0: f64,
    /// All perimeter wall pieces, outermost wall first
    pub polygons: Vec<Polygon<f64>>,
    /// Infill polyline vertices, all at `z0`
    pub infill_vertices: Vec<Vec3>,
    /// Consecutive-point infill edges
    pub infill_edges: Vec<[usize; 2]>,
    /// Combined perimeter + infill vertices, deduplicated
    pub all_vertices: Vec<Vec3>,
    /// Combined edge list, indices into `all_vertices`
    pub all_edges: Vec<[usize; 2]>,
}

impl LayerPaths {
    /// Merge the perimeter rings and the infill graph into one indexed view
    ///
    /// Every ring (exterior and holes) is lifted to `z0` and closed with a
    /// cycle of edges; the combined vertex list is deduplicated by exact
    /// coordinates and edges are remapped through the surviving indices.
    pub fn assemble(z0: f64, polygons: Vec<Polygon<f64>>, infill: InfillGraph) -> Self {
        let mut combined_vertices: Vec<Vec3> = infill.vertices.clone();
        let mut combined_edges: Vec<[usize; 2]> = infill.edges.clone();

        for polygon in &polygons {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
                let points = ring_points(ring);
                if points.len() < 2 {
                    continue;
                }
                let base = combined_vertices.len();
                for c in points {
                    combined_vertices.push(Vec3::new(c.x, c.y, z0));
                }
                let n = points.len();
                for k in 0..n {
                    combined_edges.push([base + k, base + (k + 1) % n]);
                }
            }
        }

        let (all_vertices, all_edges) = dedup_graph(combined_vertices, combined_edges);

        Self {
            z0,
            polygons,
            infill_vertices: infill.vertices,
            infill_edges: infill.edges,
            all_vertices,
            all_edges,
        }
    }

    /// Total printed path segments in the merged view
    pub fn segment_count(&self) -> usize {
        self.all_edges.len()
    }
}

/// Ring coordinates without the duplicated closing point
fn ring_points(ring: &LineString<f64>) -> &[geo::Coord<f64>] {
    let coords = &ring.0;
    match coords.split_last() {
        Some((last, rest)) if !rest.is_empty() && last == &coords[0] => rest,
        _ => coords,
    }
}

/// Deduplicate vertices by exact coordinates and remap edges
fn dedup_graph(vertices: Vec<Vec3>, edges: Vec<[usize; 2]>) -> (Vec<Vec3>, Vec<[usize; 2]>) {
    let mut unique: Vec<Vec3> = Vec::with_capacity(vertices.len());
    let mut index: HashMap<(u64, u64, u64), usize> = HashMap::new();
    let mut remap: Vec<usize> = Vec::with_capacity(vertices.len());

    for v in vertices {
        let key = (v.x.to_bits(), v.y.to_bits(), v.z.to_bits());
        let idx = *index.entry(key).or_insert_with(|| {
            unique.push(v);
            unique.len() - 1
        });
        remap.push(idx);
    }

    let remapped = edges
        .into_iter()
        .map(|[a, b]| [remap[a], remap[b]])
        .filter(|[a, b]| a != b)
        .collect();

    (unique, remapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;

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

    fn tiny_infill() -> InfillGraph {
        InfillGraph {
            vertices: vec![
                Vec3::new(2.0, 2.0, 1.0),
                Vec3::new(3.0, 2.0, 1.0),
                Vec3::new(3.0, 3.0, 1.0),
            ],
            edges: vec![[0, 1], [1, 2]],
        }
    }

    #[test]
    fn test_assemble_counts() {
        let layer = LayerPaths::assemble(1.0, vec![square((0.0, 0.0), 10.0)], tiny_infill());

        // 3 infill vertices + 4 ring corners, no coordinate collisions
        assert_eq!(layer.all_vertices.len(), 7);
        // 2 infill edges + 4 ring cycle edges
        assert_eq!(layer.all_edges.len(), 6);
        assert_eq!(layer.segment_count(), 6);
        assert!(layer.all_vertices.iter().all(|v| v.z == 1.0));
    }

    #[test]
    fn test_assemble_edge_indices_valid() {
        let layer = LayerPaths::assemble(
            1.0,
            vec![square((0.0, 0.0), 10.0), square((20.0, 0.0), 5.0)],
            tiny_infill(),
        );
        for e in &layer.all_edges {
            assert!(e[0] < layer.all_vertices.len());
            assert!(e[1] < layer.all_vertices.len());
            assert_ne!(e[0], e[1]);
        }
    }

    #[test]
    fn test_assemble_ring_closed() {
        let layer = LayerPaths::assemble(0.5, vec![square((0.0, 0.0), 4.0)], InfillGraph::default());
        // The 4 ring vertices each appear in exactly two cycle edges
        assert_eq!(layer.all_vertices.len(), 4);
        assert_eq!(layer.all_edges.len(), 4);
        let mut degree = vec![0usize; layer.all_vertices.len()];
        for e in &layer.all_edges {
            degree[e[0]] += 1;
            degree[e[1]] += 1;
        }
        assert!(degree.iter().all(|&d| d == 2));
    }

    #[test]
    fn test_assemble_hole_rings_included() {
        let with_hole = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            vec![LineString::from(vec![
                (4.0, 4.0),
                (4.0, 6.0),
                (6.0, 6.0),
                (6.0, 4.0),
            ])],
        );
        let layer = LayerPaths::assemble(2.0, vec![with_hole], InfillGraph::default());
        assert_eq!(layer.all_vertices.len(), 8);
        assert_eq!(layer.all_edges.len(), 8);
    }

    #[test]
    fn test_assemble_dedup_shared_vertex() {
        // An infill endpoint that coincides exactly with a ring corner
        let infill = InfillGraph {
            vertices: vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(5.0, 5.0, 1.0)],
            edges: vec![[0, 1]],
        };
        let layer = LayerPaths::assemble(1.0, vec![square((0.0, 0.0), 10.0)], infill);
        // 2 infill + 4 ring - 1 shared
        assert_eq!(layer.all_vertices.len(), 5);
        assert_eq!(layer.all_edges.len(), 5);
    }
}
