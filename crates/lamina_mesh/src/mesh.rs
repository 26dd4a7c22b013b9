//! Deduplicated triangle mesh table

use std::collections::HashMap;

use lamina_math::{quantize, Vec3};
use serde::{Deserialize, Serialize};

/// Vertex pool with 9-decimal-key deduplication
///
/// Every vertex inserted is keyed by rounding each coordinate to nine decimal
/// places; vertices whose keys collide share one index. Both STL readers and
/// the per-layer cross-sections use this same rule, so coordinates that agree
/// to within ~1e-9 mm are a single point everywhere in the pipeline.
#[derive(Debug, Default)]
pub struct VertexPool {
    vertices: Vec<Vec3>,
    index_by_key: HashMap<[i64; 3], usize>,
}

impl VertexPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex, returning its index
    ///
    /// The first occurrence of a key assigns a fresh index; later occurrences
    /// reuse it.
    pub fn insert(&mut self, v: Vec3) -> usize {
        let key = [quantize(v.x), quantize(v.y), quantize(v.z)];
        if let Some(&idx) = self.index_by_key.get(&key) {
            return idx;
        }
        let idx = self.vertices.len();
        self.vertices.push(v);
        self.index_by_key.insert(key, idx);
        idx
    }

    /// Number of distinct vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Consume the pool, yielding the vertex table
    pub fn into_vertices(self) -> Vec<Vec3> {
        self.vertices
    }
}

/// Indexed triangle mesh: parallel vertex, face, and normal tables
///
/// `faces` holds index triples into `vertices`; `normals` is parallel to
/// `faces` (one unit normal per face). All coordinates are millimeters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Deduplicated vertex positions
    pub vertices: Vec<Vec3>,
    /// Vertex index triples, one per triangle
    pub faces: Vec<[usize; 3]>,
    /// Per-face normals, parallel to `faces`
    pub normals: Vec<Vec3>,
}

impl TriangleMesh {
    /// Build a mesh from raw triangles, deduplicating vertices
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = ([Vec3; 3], Vec3)>,
    {
        let mut pool = VertexPool::new();
        let mut faces = Vec::new();
        let mut normals = Vec::new();
        for ([a, b, c], normal) in triangles {
            let i1 = pool.insert(a);
            let i2 = pool.insert(b);
            let i3 = pool.insert(c);
            faces.push([i1, i2, i3]);
            normals.push(normal);
        }
        Self {
            vertices: pool.into_vertices(),
            faces,
            normals,
        }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// The corner positions of face `i`
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let [a, b, c] = self.faces[i];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Minimum and maximum z over all vertices
    ///
    /// Returns `None` for an empty mesh.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.vertices.iter();
        let first = iter.next()?;
        let mut min_z = first.z;
        let mut max_z = first.z;
        for v in iter {
            min_z = min_z.min(v.z);
            max_z = max_z.max(v.z);
        }
        Some((min_z, max_z))
    }

    /// Check the table invariants: one normal per face, indices in range
    pub fn is_consistent(&self) -> bool {
        self.faces.len() == self.normals.len()
            && self
                .faces
                .iter()
                .all(|f| f.iter().all(|&i| i < self.vertices.len()))
    }
}
