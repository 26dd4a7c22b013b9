//! Contour reconstruction
//!
//! Stitches a cross-section's unordered edge soup into closed rings, then
//! classifies rings into outer boundaries and holes by even-odd containment
//! depth and assembles polygons with holes. Winding is normalized afterwards
//! (CCW exteriors, CW holes) but classification never relies on it.

use std::collections::{BTreeMap, HashSet};

use geo::orient::{Direction, Orient};
use geo::{Contains, InteriorPoint, LineString, Point, Polygon};
use log::warn;

use crate::CrossSection;

/// Reconstruct the polygons-with-holes of one cross-section
///
/// Rings with fewer than three distinct vertices are discarded. A dead end
/// during the walk (odd-degree vertex) marks a non-manifold slice; the
/// affected partial ring is dropped with a warning and the remaining loops
/// are still extracted.
pub fn build_contours(section: &CrossSection) -> Vec<Polygon<f64>> {
    let rings = extract_rings(section);
    assemble_polygons(rings)
}

/// Walk the adjacency multi-map until every edge is consumed
fn extract_rings(section: &CrossSection) -> Vec<LineString<f64>> {
    let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for edge in &section.edges {
        adjacency.entry(edge[0]).or_default().push(edge[1]);
        adjacency.entry(edge[1]).or_default().push(edge[0]);
    }

    let mut visited: HashSet<[usize; 2]> = HashSet::new();
    let mut rings = Vec::new();

    while let Some((&start, _)) = adjacency.iter().next() {
        let mut path = vec![start];
        let mut current = start;
        let mut closed = false;

        loop {
            let next = adjacency
                .get(&current)
                .and_then(|neighbors| {
                    neighbors
                        .iter()
                        .copied()
                        .find(|&n| !visited.contains(&sorted_pair(current, n)))
                });

            let Some(next) = next else {
                break;
            };
            visited.insert(sorted_pair(current, next));
            path.push(next);
            current = next;
            if current == start {
                closed = true;
                break;
            }
        }

        // Remove every walked edge (including the closing one) so the
        // outer loop terminates
        for pair in path.windows(2) {
            remove_edge(&mut adjacency, pair[0], pair[1]);
        }
        if path.len() == 1 {
            // Seed vertex with only visited edges left; discard it outright
            adjacency.remove(&start);
        }

        if closed {
            // Drop the duplicated closing vertex; geo closes rings itself
            path.pop();
            let distinct: HashSet<usize> = path.iter().copied().collect();
            if distinct.len() >= 3 {
                let coords: Vec<(f64, f64)> = path
                    .iter()
                    .map(|&i| {
                        let v = section.vertices[i];
                        (v.x, v.y)
                    })
                    .collect();
                rings.push(LineString::from(coords));
            }
        } else if path.len() > 1 {
            warn!(
                "non-manifold slice at z = {}: dead end after {} vertices, dropping partial ring",
                section.z0,
                path.len()
            );
        }
    }

    rings
}

/// Classify rings by even-odd depth and attach holes to their outers
fn assemble_polygons(rings: Vec<LineString<f64>>) -> Vec<Polygon<f64>> {
    // Representative interior point of each ring, used for all containment
    let hulls: Vec<Polygon<f64>> = rings
        .iter()
        .map(|ring| Polygon::new(ring.clone(), vec![]))
        .collect();
    let anchors: Vec<Option<Point<f64>>> =
        hulls.iter().map(|hull| hull.interior_point()).collect();

    let mut depths = vec![0usize; rings.len()];
    for i in 0..rings.len() {
        let Some(anchor) = anchors[i] else {
            continue;
        };
        depths[i] = hulls
            .iter()
            .enumerate()
            .filter(|(j, hull)| *j != i && hull.contains(&anchor))
            .count();
    }

    // Even depth: outer boundary. Odd depth: hole.
    let mut outers: Vec<(usize, Polygon<f64>)> = Vec::new();
    for (i, hull) in hulls.iter().enumerate() {
        if anchors[i].is_some() && depths[i] % 2 == 0 {
            outers.push((i, hull.clone()));
        }
    }

    for (i, ring) in rings.iter().enumerate() {
        if anchors[i].is_none() || depths[i] % 2 == 0 {
            continue;
        }
        let anchor = anchors[i].expect("checked above");
        let parent = outers.iter_mut().find(|(outer_idx, outer)| {
            depths[*outer_idx] + 1 == depths[i] && outer.contains(&anchor)
        });
        match parent {
            Some((_, outer)) => outer.interiors_push(ring.clone()),
            None => warn!("hole ring without a containing outer ring, dropping it"),
        }
    }

    outers
        .into_iter()
        .map(|(_, polygon)| polygon.orient(Direction::Default))
        .collect()
}

fn sorted_pair(a: usize, b: usize) -> [usize; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

fn remove_edge(adjacency: &mut BTreeMap<usize, Vec<usize>>, a: usize, b: usize) {
    for (from, to) in [(a, b), (b, a)] {
        if let Some(neighbors) = adjacency.get_mut(&from) {
            if let Some(pos) = neighbors.iter().position(|&n| n == to) {
                neighbors.remove(pos);
            }
            if neighbors.is_empty() {
                adjacency.remove(&from);
            }
        }
    }
}
