//! Plane/mesh intersection
//!
//! A [`CrossSection`] is the planar edge soup produced by cutting every mesh
//! triangle with one horizontal plane. Triangles lying in the plane go
//! through a multiplicity-counted edge bag so that only the boundary of the
//! coplanar patch survives; all other triangles contribute at most one
//! intersection segment each.

use std::collections::{HashMap, HashSet};

use lamina_math::{Vec2, Vec3, PLANE_EPS};
use lamina_mesh::{TriangleMesh, VertexPool};
use serde::{Deserialize, Serialize};

/// The planar cross-section of a mesh at one z plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossSection {
    /// Height of the slicing plane
    pub z0: f64,
    /// Intersection vertices, lifted to `(x, y, z0)` and deduplicated
    pub vertices: Vec<Vec3>,
    /// Sorted index pairs into `vertices`; no duplicates, endpoints distinct
    pub edges: Vec<[usize; 2]>,
    /// Planar normals parallel to `edges`; not populated by this core
    pub edge_normals: Vec<Vec2>,
}

impl CrossSection {
    /// Intersect every triangle of `mesh` with the plane `z = z0`
    pub fn slice_mesh(mesh: &TriangleMesh, z0: f64) -> Self {
        let mut pool = VertexPool::new();
        let mut edges: Vec<[usize; 2]> = Vec::new();
        let mut edge_seen: HashSet<[usize; 2]> = HashSet::new();
        let mut coplanar_count: HashMap<[usize; 2], u32> = HashMap::new();
        // Deterministic emission order for the count==1 bag edges
        let mut coplanar_order: Vec<[usize; 2]> = Vec::new();

        // First pass: coplanar triangles feed the multiplicity bag. Interior
        // edges are shared by two coplanar triangles and cancel; only the
        // boundary of the coplanar patch (count == 1) is kept.
        for i in 0..mesh.triangle_count() {
            let tri = mesh.triangle(i);
            if !is_coplanar(&tri, z0) {
                continue;
            }
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                let ia = pool.insert(Vec3::new(tri[a].x, tri[a].y, z0));
                let ib = pool.insert(Vec3::new(tri[b].x, tri[b].y, z0));
                let key = sorted_pair(ia, ib);
                let count = coplanar_count.entry(key).or_insert(0);
                if *count == 0 {
                    coplanar_order.push(key);
                }
                *count += 1;
            }
        }

        for key in coplanar_order {
            if coplanar_count[&key] == 1 && key[0] != key[1] && edge_seen.insert(key) {
                edges.push(key);
            }
        }

        // Second pass: transverse triangles. Vertices on the plane are taken
        // verbatim; edges with a strict sign change contribute the linear
        // interpolation point. Two distinct points make one segment.
        for i in 0..mesh.triangle_count() {
            let tri = mesh.triangle(i);
            if is_coplanar(&tri, z0) {
                continue;
            }

            let mut points = plane_triangle_points(&tri, z0);
            dedup_exact(&mut points);

            let indices: Vec<usize> = points.into_iter().map(|p| pool.insert(p)).collect();
            match indices.len() {
                2 => push_edge(&mut edges, &mut edge_seen, indices[0], indices[1]),
                3 => {
                    // Degenerate near-coplanar triangle: keep its outline
                    push_edge(&mut edges, &mut edge_seen, indices[0], indices[1]);
                    push_edge(&mut edges, &mut edge_seen, indices[1], indices[2]);
                    push_edge(&mut edges, &mut edge_seen, indices[2], indices[0]);
                }
                _ => {}
            }
        }

        Self {
            z0,
            vertices: pool.into_vertices(),
            edges,
            edge_normals: Vec::new(),
        }
    }

    /// Number of intersection segments
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the plane missed the mesh entirely
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn is_coplanar(tri: &[Vec3; 3], z0: f64) -> bool {
    tri.iter().all(|v| (v.z - z0).abs() < PLANE_EPS)
}

/// Intersection points of one transverse triangle with the plane `z = z0`
fn plane_triangle_points(tri: &[Vec3; 3], z0: f64) -> Vec<Vec3> {
    let mut points = Vec::new();

    // Vertices lying on the plane
    for v in tri {
        if (v.z - z0).abs() < PLANE_EPS {
            points.push(Vec3::new(v.x, v.y, z0));
        }
    }

    // Edges crossing the plane. The strict `< -PLANE_EPS` test means an edge
    // touching the plane at an endpoint is handled by the vertex case alone.
    for (a, b) in [(0, 1), (1, 2), (2, 0)] {
        let (v1, v2) = (tri[a], tri[b]);
        let d1 = v1.z - z0;
        let d2 = v2.z - z0;
        if d1 * d2 < -PLANE_EPS {
            let t = (z0 - v1.z) / (v2.z - v1.z);
            points.push(Vec3::new(
                v1.x + t * (v2.x - v1.x),
                v1.y + t * (v2.y - v1.y),
                z0,
            ));
        }
    }

    points
}

fn dedup_exact(points: &mut Vec<Vec3>) {
    let mut unique: Vec<Vec3> = Vec::with_capacity(points.len());
    for p in points.iter() {
        if !unique.contains(p) {
            unique.push(*p);
        }
    }
    *points = unique;
}

fn sorted_pair(a: usize, b: usize) -> [usize; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

fn push_edge(edges: &mut Vec<[usize; 2]>, seen: &mut HashSet<[usize; 2]>, a: usize, b: usize) {
    if a == b {
        return;
    }
    let key = sorted_pair(a, b);
    if seen.insert(key) {
        edges.push(key);
    }
}
