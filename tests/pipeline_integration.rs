//! End-to-end pipeline tests
//!
//! Exercises the whole chain on known solids: axis-aligned cubes, a hollow
//! cube, and a tetrahedron, plus STL round-trips and recovery from a
//! non-manifold input.

use geo::Area;
use lamina::{
    build_contours, interior_region, stl, CrossSection, LayerMode, PerimeterSet, Slicer,
    SlicerConfig, TriangleMesh, Vec3, WaveOrientation,
};

/// Axis-aligned box with one corner at `origin`; `invert` flips the surface
/// inside out (used for cavity walls)
fn boxed(origin: Vec3, size: Vec3, invert: bool) -> Vec<([Vec3; 3], Vec3)> {
    let corner =
        |x: f64, y: f64, z: f64| Vec3::new(origin.x + x * size.x, origin.y + y * size.y, origin.z + z * size.z);
    let c000 = corner(0.0, 0.0, 0.0);
    let c100 = corner(1.0, 0.0, 0.0);
    let c010 = corner(0.0, 1.0, 0.0);
    let c110 = corner(1.0, 1.0, 0.0);
    let c001 = corner(0.0, 0.0, 1.0);
    let c101 = corner(1.0, 0.0, 1.0);
    let c011 = corner(0.0, 1.0, 1.0);
    let c111 = corner(1.0, 1.0, 1.0);
    let mut triangles = vec![
        ([c000, c010, c110], -Vec3::Z),
        ([c000, c110, c100], -Vec3::Z),
        ([c001, c101, c111], Vec3::Z),
        ([c001, c111, c011], Vec3::Z),
        ([c000, c100, c101], -Vec3::Y),
        ([c000, c101, c001], -Vec3::Y),
        ([c010, c011, c111], Vec3::Y),
        ([c010, c111, c110], Vec3::Y),
        ([c000, c001, c011], -Vec3::X),
        ([c000, c011, c010], -Vec3::X),
        ([c100, c110, c111], Vec3::X),
        ([c100, c111, c101], Vec3::X),
    ];
    if invert {
        for (tri, normal) in &mut triangles {
            tri.swap(1, 2);
            *normal = -*normal;
        }
    }
    triangles
}

fn cube(origin: Vec3, size: f64) -> TriangleMesh {
    TriangleMesh::from_triangles(boxed(origin, Vec3::new(size, size, size), false))
}

/// 20mm cube with a concentric 10mm cavity
fn hollow_cube() -> TriangleMesh {
    let mut triangles = boxed(Vec3::ZERO, Vec3::new(20.0, 20.0, 20.0), false);
    triangles.extend(boxed(
        Vec3::new(5.0, 5.0, 5.0),
        Vec3::new(10.0, 10.0, 10.0),
        true,
    ));
    TriangleMesh::from_triangles(triangles)
}

fn tetrahedron() -> TriangleMesh {
    let base0 = Vec3::new(0.0, 0.0, 0.0);
    let base1 = Vec3::new(10.0, 0.0, 0.0);
    let base2 = Vec3::new(0.0, 10.0, 0.0);
    let apex = Vec3::new(0.0, 0.0, 10.0);
    TriangleMesh::from_triangles(vec![
        ([base0, base2, base1], -Vec3::Z),
        ([base0, base1, apex], Vec3::ZERO),
        ([base1, base2, apex], Vec3::ZERO),
        ([base2, base0, apex], Vec3::ZERO),
    ])
}

#[test]
fn cube_mid_slice_offsets() {
    let mesh = cube(Vec3::ZERO, 20.0);
    let section = CrossSection::slice_mesh(&mesh, 10.0);
    let polygons = build_contours(&section);

    assert_eq!(polygons.len(), 1);
    assert!(polygons[0].interiors().is_empty());
    assert!((polygons[0].unsigned_area() - 400.0).abs() < 1e-9);

    // Walls at centerline radii 0.25 and 0.75: squares of side 19.5, 18.5
    let walls = PerimeterSet::build(&polygons[0], 0.5, 2);
    assert_eq!(walls.walls.len(), 2);
    assert!((walls.walls[0].pieces[0].unsigned_area() - 19.5 * 19.5).abs() < 1e-6);
    assert!((walls.walls[1].pieces[0].unsigned_area() - 18.5 * 18.5).abs() < 1e-6);

    // Infill region sits 1.25 inside: side 17.5
    let interior = interior_region(&polygons, 0.5, 2);
    assert_eq!(interior.len(), 1);
    assert!((interior[0].unsigned_area() - 17.5 * 17.5).abs() < 1e-6);
}

#[test]
fn hollow_cube_mid_slice_depths() {
    let section = CrossSection::slice_mesh(&hollow_cube(), 10.0);
    let polygons = build_contours(&section);

    // One outer ring (area 400) carrying one hole (area 100)
    assert_eq!(polygons.len(), 1);
    assert_eq!(polygons[0].interiors().len(), 1);
    assert!((polygons[0].unsigned_area() - 300.0).abs() < 1e-9);

    let outer_only = geo::Polygon::new(polygons[0].exterior().clone(), vec![]);
    assert!((outer_only.unsigned_area() - 400.0).abs() < 1e-9);
}

#[test]
fn tetrahedron_mid_slice_ring() {
    let section = CrossSection::slice_mesh(&tetrahedron(), 5.0);
    let polygons = build_contours(&section);

    assert_eq!(polygons.len(), 1);
    // The ring's three vertices are the lateral edge midpoints
    let exterior = polygons[0].exterior();
    assert_eq!(exterior.0.len(), 4); // closed ring, first == last
    for expected in [(0.0, 0.0), (5.0, 0.0), (0.0, 5.0)] {
        assert!(exterior
            .0
            .iter()
            .any(|c| (c.x - expected.0).abs() < 1e-9 && (c.y - expected.1).abs() < 1e-9));
    }
}

#[test]
fn count_mode_top_clamp() {
    // 20x20 footprint, 10 tall, five layers
    let mesh = TriangleMesh::from_triangles(boxed(
        Vec3::ZERO,
        Vec3::new(20.0, 20.0, 10.0),
        false,
    ));
    let mut config = SlicerConfig::default();
    config.layers.mode = LayerMode::Count;
    config.layers.value = 5.0;

    let slicer = Slicer::new(mesh.clone(), config);
    let schedule = slicer.schedule().unwrap();
    assert_eq!(schedule.planes(), &[0.0, 2.5, 5.0, 7.5, 10.0 - 1e-5]);

    // The clamped top plane still cuts a full square
    let top = CrossSection::slice_mesh(&mesh, 10.0 - 1e-5);
    let polygons = build_contours(&top);
    assert_eq!(polygons.len(), 1);
    assert!((polygons[0].unsigned_area() - 400.0).abs() < 1e-3);

    let report = slicer.slice().unwrap();
    assert_eq!(report.layers.len(), 5);
    assert!(!report.layers.last().unwrap().polygons.is_empty());
}

#[test]
fn gyroid_layers_present_and_rotating() {
    let mut config = SlicerConfig::default();
    config.extrusion.line_width = 0.4;
    config.extrusion.wall_count = 2;

    let slicer = Slicer::new(cube(Vec3::ZERO, 40.0), config);
    let report = slicer.slice().unwrap();

    // The base layer's wave section degenerates to straight lines but must
    // still fill the interior
    let base = &report.layers[0];
    assert_eq!(base.z0, 0.0);
    assert!(!base.infill_edges.is_empty());
    for v in &base.infill_vertices {
        assert_eq!(v.z, 0.0);
        assert!(v.x > 0.9 && v.x < 39.1);
    }

    // Orientation flips between z = 0 and z = pi/2
    assert_eq!(WaveOrientation::for_layer(0.0), WaveOrientation::Vertical);
    assert_eq!(
        WaveOrientation::for_layer(std::f64::consts::FRAC_PI_2),
        WaveOrientation::Horizontal
    );

    // Every layer of a 40mm cube keeps its perimeter walls
    assert!(report.layers.iter().all(|l| !l.polygons.is_empty()));
}

#[test]
fn stl_roundtrip_preserves_tables() {
    let mesh = cube(Vec3::new(-5.0, 3.0, 0.0), 12.5);
    let bytes = stl::to_binary_bytes(&mesh);
    let reread = stl::parse(&bytes).unwrap();

    assert_eq!(reread.vertices, mesh.vertices);
    assert_eq!(reread.faces, mesh.faces);
    assert_eq!(reread.normals, mesh.normals);
}

#[test]
fn stl_roundtrip_through_file() {
    let mesh = cube(Vec3::ZERO, 20.0);
    let path = std::env::temp_dir().join(format!("lamina-cube-{}.stl", std::process::id()));
    stl::write_binary(&mesh, &path).unwrap();

    let slicer = Slicer::from_stl(&path, SlicerConfig::default()).unwrap();
    assert_eq!(slicer.mesh().triangle_count(), 12);
    assert_eq!(slicer.mesh().vertices, mesh.vertices);

    std::fs::remove_file(&path).ok();
}

#[test]
fn slicing_is_idempotent() {
    let mesh = cube(Vec3::ZERO, 20.0);
    let slicer = Slicer::new(mesh.clone(), SlicerConfig::default());
    let schedule = slicer.schedule().unwrap();

    for &z0 in schedule.planes() {
        let a = CrossSection::slice_mesh(&mesh, z0);
        let b = CrossSection::slice_mesh(&mesh, z0);
        assert_eq!(a.edges, b.edges);
        assert_eq!(a.vertices, b.vertices);
    }
}

#[test]
fn duplicated_triangle_slices_without_fatal_error() {
    // A duplicated bottom-face triangle makes the mesh non-manifold; the
    // duplicate's outline edges cancel in the coplanar bag and the run
    // completes
    let mesh = cube(Vec3::ZERO, 20.0);
    let mut faces = mesh.faces.clone();
    let mut normals = mesh.normals.clone();
    faces.push(faces[0]);
    normals.push(normals[0]);
    let doubled = TriangleMesh {
        vertices: mesh.vertices.clone(),
        faces,
        normals,
    };

    let path = std::env::temp_dir().join(format!("lamina-dup-{}.stl", std::process::id()));
    stl::write_binary(&doubled, &path).unwrap();

    let slicer = Slicer::from_stl(&path, SlicerConfig::default()).unwrap();
    assert_eq!(slicer.mesh().triangle_count(), 13);

    let report = slicer.slice().unwrap();
    assert_eq!(report.layers.len(), 21);
    // Mid layers are untouched by the duplicate
    let mid = &report.layers[10];
    assert!(!mid.polygons.is_empty());
    assert!(!mid.all_edges.is_empty());

    std::fs::remove_file(&path).ok();
}

#[test]
fn all_edges_reference_valid_vertices() {
    let slicer = Slicer::new(hollow_cube(), SlicerConfig::default());
    let report = slicer.slice().unwrap();

    for layer in &report.layers {
        for e in &layer.infill_edges {
            assert!(e[0] < layer.infill_vertices.len());
            assert!(e[1] < layer.infill_vertices.len());
        }
        for e in &layer.all_edges {
            assert!(e[0] < layer.all_vertices.len());
            assert!(e[1] < layer.all_vertices.len());
            assert_ne!(e[0], e[1]);
        }
        for v in &layer.all_vertices {
            assert!((v.z - layer.z0).abs() < 1e-9);
        }
    }
}
