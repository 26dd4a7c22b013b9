//! Gyroid infill generation
//!
//! The infill pattern is a planar section of the gyroid surface
//! `sin x cos y + sin y cos z + sin z cos x = 0`. For a fixed layer height
//! the section is a wave `y(x)` whose shape drifts with z and whose dominant
//! direction flips between horizontal and vertical every quarter period.
//! One period of the wave is sampled adaptively, tiled across the layer's
//! bounding box, and clipped to the region left inside the innermost wall.

use std::collections::HashMap;
use std::f64::consts::PI;

use geo::{BooleanOps, BoundingRect, EuclideanLength, LineString, MultiLineString, Polygon};
use log::{debug, warn};

use lamina_math::{Aabb2, Vec2, Vec3, MIN_SEGMENT_LENGTH};

use crate::perimeter;

/// Dominant direction of the gyroid wave at a given layer height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveOrientation {
    /// Waves advance along x, tiled in y
    Horizontal,
    /// Waves advance along y, tiled in x
    Vertical,
}

impl WaveOrientation {
    /// Orientation at layer height `z0` (normalized frame, period 2pi)
    pub fn for_layer(z0: f64) -> Self {
        if z0.sin().abs() <= z0.cos().abs() {
            WaveOrientation::Vertical
        } else {
            WaveOrientation::Horizontal
        }
    }

    /// Whether the wave advances along y
    pub fn is_vertical(self) -> bool {
        matches!(self, WaveOrientation::Vertical)
    }
}

/// Gyroid infill sampler and tiler
///
/// `line_spacing` is the nominal nozzle line spacing; tiling multiplies it
/// by 3 to account for the wave's lateral extent within one period.
#[derive(Debug, Clone)]
pub struct GyroidInfill {
    /// Nominal infill line spacing (mm)
    pub line_spacing: f64,
    /// Base sampling step along the wave (radians of gyroid phase)
    pub sampling_step: f64,
    /// Chord-slope tolerance that triggers midpoint refinement
    pub tolerance: f64,
    /// Cap on refinement steps for a single segment
    pub max_iterations: u32,
}

impl Default for GyroidInfill {
    fn default() -> Self {
        Self {
            line_spacing: 1.0,
            sampling_step: PI / 50.0,
            tolerance: 0.1,
            max_iterations: 100,
        }
    }
}

impl GyroidInfill {
    /// Generate clipped infill polylines for one layer
    ///
    /// `polygons` are the layer's reconstructed polygons-with-holes; the
    /// waves are clipped to the region `line_width * (wall_count + 0.5)`
    /// inside them. Returns an empty set when the interior dissolves.
    pub fn generate(
        &self,
        polygons: &[Polygon<f64>],
        line_width: f64,
        wall_count: usize,
        z0: f64,
    ) -> MultiLineString<f64> {
        if polygons.is_empty() {
            return MultiLineString::new(vec![]);
        }

        let interior = perimeter::interior_region(polygons, line_width, wall_count);
        if interior.is_empty() {
            warn!("layer z = {}: interior dissolved, no infill", z0);
            return MultiLineString::new(vec![]);
        }

        let Some(bounds) = bounding_box_of(polygons) else {
            return MultiLineString::new(vec![]);
        };
        let width = bounds.width();
        let height = bounds.height();
        let vertical = WaveOrientation::for_layer(z0).is_vertical();

        let (xs, ys) = self.sample_period(width, height, z0, vertical);
        let waves = self.tile_waves(&xs, &ys, &bounds, self.line_spacing * 3.0, vertical);
        if waves.is_empty() {
            warn!("layer z = {}: degenerate wave sample, no infill", z0);
            return MultiLineString::new(vec![]);
        }
        let waves = MultiLineString::new(waves);

        let mut pieces: Vec<LineString<f64>> = Vec::new();
        for region in &interior {
            let clipped = region.clip(&waves, false);
            for line in clipped {
                if line.euclidean_length() > MIN_SEGMENT_LENGTH {
                    pieces.push(line);
                }
            }
        }

        let merged = merge_polylines(pieces);
        debug!("layer z = {}: {} infill polylines", z0, merged.len());
        MultiLineString::new(merged)
    }

    /// Adaptively sample one period of the wave
    ///
    /// Returns parallel sample/value lists. For the vertical orientation the
    /// wave advances along y, so the extents swap roles: the parameter runs
    /// over the box height and values are normalized into the box width.
    fn sample_period(
        &self,
        width: f64,
        height: f64,
        z0: f64,
        vertical: bool,
    ) -> (Vec<f64>, Vec<f64>) {
        let (span, amplitude) = if vertical {
            (height, width)
        } else {
            (width, height)
        };

        let mut xs = vec![0.0];
        let mut ys = vec![normalize_sample(wave_value(0.0, z0, vertical), amplitude)];

        let mut x = self.sampling_step;
        while x < span {
            let y = normalize_sample(wave_value(x, z0, vertical), amplitude);

            // Midpoint refinement: a candidate whose chord slope from the
            // last retained sample is too steep gets a midpoint inserted
            // ahead of it. Accepting the candidate resets the chord, so the
            // loop settles well inside the iteration cap.
            let mut iterations = 0;
            while chord_slope(&xs, &ys, x, y).abs() > self.tolerance
                && iterations < self.max_iterations
            {
                iterations += 1;
                let xm = 0.5 * (x + xs.last().copied().expect("seeded above"));
                xs.push(xm);
                ys.push(normalize_sample(wave_value(xm, z0, vertical), amplitude));
                xs.push(x);
                ys.push(y);
            }
            // Flat stretches are retained too; they tile as straight runs
            if xs.last() != Some(&x) {
                xs.push(x);
                ys.push(y);
            }

            x += self.sampling_step;
        }

        (xs, ys)
    }

    /// Tile the sampled wave across the bounding box
    ///
    /// Copies start at `-spacing / 2` and advance by `spacing` until the
    /// offset reaches the box height. Vertical waves swap the x/y roles of
    /// the sample coordinates.
    fn tile_waves(
        &self,
        xs: &[f64],
        ys: &[f64],
        bounds: &Aabb2,
        spacing: f64,
        vertical: bool,
    ) -> Vec<LineString<f64>> {
        let mut lines = Vec::new();
        if xs.len() < 2 {
            return lines;
        }
        let min = bounds.min;
        let height = bounds.height();

        let mut offset = -spacing / 2.0;
        while offset < height {
            let coords: Vec<(f64, f64)> = if vertical {
                xs.iter()
                    .zip(ys)
                    .map(|(&sx, &sy)| (sy + min.x - offset, sx + min.y))
                    .collect()
            } else {
                xs.iter()
                    .zip(ys)
                    .map(|(&sx, &sy)| (sx + min.x, sy + min.y + offset - height * 0.5))
                    .collect()
            };
            lines.push(LineString::from(coords));
            offset += spacing;
        }
        lines
    }
}

/// Closed-form section of the gyroid at phase `x`, layer height `z`
fn wave_value(x: f64, z: f64, vertical: bool) -> f64 {
    let z_sin = z.sin();
    let z_cos = z.cos();
    if vertical {
        let phase = if z_cos < 0.0 { PI } else { 0.0 };
        let a = (x + phase).sin();
        let b = -z_cos;
        let res = z_sin * (x + phase).cos();
        let r = (a * a + b * b).sqrt();
        z_sin * clipped_asin(a / r) + clipped_asin(res / r) + PI
    } else {
        let phase = if z_sin >= 0.0 { 0.0 } else { PI };
        let a = (x + phase).cos();
        let b = -z_sin;
        let res = z_cos * (x + phase).sin();
        let r = (a * a + b * b).sqrt();
        z_cos * clipped_asin(a / r) + clipped_asin(res / r) + 0.5 * PI
    }
}

/// Saturating arcsine; the ratio can drift past +-1 by rounding
fn clipped_asin(value: f64) -> f64 {
    value.clamp(-1.0, 1.0).asin()
}

/// Map a raw wave value from [-2pi, 2pi] into [0, amplitude]
fn normalize_sample(value: f64, amplitude: f64) -> f64 {
    (value + 2.0 * PI) / (4.0 * PI) * amplitude
}

fn chord_slope(xs: &[f64], ys: &[f64], x: f64, y: f64) -> f64 {
    let last_x = *xs.last().expect("sample lists are seeded");
    let last_y = *ys.last().expect("sample lists are seeded");
    (y - last_y) / (x - last_x).max(1e-12)
}

fn bounding_box_of(polygons: &[Polygon<f64>]) -> Option<Aabb2> {
    let mut aabb: Option<Aabb2> = None;
    for polygon in polygons {
        let Some(r) = polygon.bounding_rect() else {
            continue;
        };
        let next = Aabb2::new(
            Vec2::new(r.min().x, r.min().y),
            Vec2::new(r.max().x, r.max().y),
        );
        aabb = Some(match aabb {
            None => next,
            Some(acc) => acc.union(&next),
        });
    }
    aabb
}

/// Join clipped pieces into maximal polylines
///
/// Pieces are joined only at points where exactly two polyline ends meet,
/// matching shapely's `linemerge` semantics.
pub fn merge_polylines(pieces: Vec<LineString<f64>>) -> Vec<LineString<f64>> {
    let key = |c: &geo::Coord<f64>| (c.x.to_bits(), c.y.to_bits());

    // Every polyline end registered by its exact coordinates
    let mut ends: HashMap<(u64, u64), Vec<usize>> = HashMap::new();
    for (i, line) in pieces.iter().enumerate() {
        let coords = &line.0;
        if coords.len() < 2 {
            continue;
        }
        ends.entry(key(&coords[0])).or_default().push(i);
        ends.entry(key(&coords[coords.len() - 1])).or_default().push(i);
    }

    let mut used = vec![false; pieces.len()];
    let mut merged = Vec::new();

    for i in 0..pieces.len() {
        if used[i] || pieces[i].0.len() < 2 {
            continue;
        }
        used[i] = true;
        let mut chain: Vec<geo::Coord<f64>> = pieces[i].0.clone();

        // Grow at the tail, then at the head
        for grow_tail in [true, false] {
            loop {
                let joint = if grow_tail {
                    *chain.last().expect("chain is non-empty")
                } else {
                    chain[0]
                };
                let Some(candidates) = ends.get(&key(&joint)) else {
                    break;
                };
                if candidates.len() != 2 {
                    break;
                }
                let Some(&next) = candidates.iter().find(|&&j| !used[j]) else {
                    break;
                };
                used[next] = true;

                let mut addition = pieces[next].0.clone();
                if key(&addition[0]) != key(&joint) {
                    addition.reverse();
                }
                debug_assert_eq!(key(&addition[0]), key(&joint));
                if grow_tail {
                    chain.extend(addition.into_iter().skip(1));
                } else {
                    addition.reverse();
                    let tail = chain.split_off(0);
                    chain = addition;
                    chain.extend(tail.into_iter().skip(1));
                }
            }
        }

        merged.push(LineString::new(chain));
    }

    merged
}

/// Indexed infill polyline graph for one layer
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct InfillGraph {
    /// Polyline vertices, all at the layer height
    pub vertices: Vec<Vec3>,
    /// Consecutive-point edges, indices into `vertices`
    pub edges: Vec<[usize; 2]>,
}

impl InfillGraph {
    /// Flatten merged polylines into a deduplicated vertex/edge graph
    pub fn from_polylines(lines: &MultiLineString<f64>, z0: f64) -> Self {
        let mut vertices: Vec<Vec3> = Vec::new();
        let mut index: HashMap<(u64, u64, u64), usize> = HashMap::new();
        let mut edges: Vec<[usize; 2]> = Vec::new();

        for line in &lines.0 {
            if line.0.len() < 2 {
                continue;
            }
            let mut prev: Option<usize> = None;
            for c in &line.0 {
                let v = Vec3::new(c.x, c.y, z0);
                let k = (v.x.to_bits(), v.y.to_bits(), v.z.to_bits());
                let idx = *index.entry(k).or_insert_with(|| {
                    vertices.push(v);
                    vertices.len() - 1
                });
                if let Some(p) = prev {
                    if p != idx {
                        edges.push([p, idx]);
                    }
                }
                prev = Some(idx);
            }
        }

        Self { vertices, edges }
    }
}
