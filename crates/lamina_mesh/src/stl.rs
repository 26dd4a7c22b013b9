//! STL reading and writing
//!
//! Both STL flavors are supported. Binary layout: an 80-byte header, a 4-byte
//! little-endian triangle count, then one 50-byte record per triangle (normal,
//! three vertices, 2-byte attribute count). ASCII is token-oriented with
//! `facet normal`, `vertex`, and `endloop` keywords.
//!
//! Format detection has one wrinkle: some binary files begin with the ASCII
//! word `solid`. A file is treated as ASCII only if it starts with `solid`
//! *and* its size does not match the binary size formula derived from the
//! triangle count at offset 80.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use lamina_math::Vec3;

use crate::{MeshError, TriangleMesh, VertexPool};

/// Size of one binary triangle record in bytes
const BINARY_RECORD_SIZE: u64 = 50;
/// Header plus triangle count
const BINARY_PREAMBLE_SIZE: u64 = 84;

/// Load an STL file, auto-detecting its format
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleMesh, MeshError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    parse(&bytes)
}

/// Parse STL data, auto-detecting its format
pub fn parse(bytes: &[u8]) -> Result<TriangleMesh, MeshError> {
    if is_ascii_stl(bytes) {
        parse_ascii(bytes)
    } else {
        parse_binary(bytes)
    }
}

/// Decide whether the payload is ASCII STL
///
/// `solid`-prefixed data whose length exactly matches the binary size formula
/// is binary; `solid`-prefixed data too short to carry a binary triangle
/// count is ASCII.
pub fn is_ascii_stl(bytes: &[u8]) -> bool {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or(&[]);
    let first_line = String::from_utf8_lossy(first_line);
    if !first_line.trim_start().to_ascii_lowercase().starts_with("solid") {
        return false;
    }
    if (bytes.len() as u64) < BINARY_PREAMBLE_SIZE {
        return true;
    }
    let num_triangles = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as u64;
    let expected_size = BINARY_PREAMBLE_SIZE + num_triangles * BINARY_RECORD_SIZE;
    bytes.len() as u64 != expected_size
}

fn parse_binary(bytes: &[u8]) -> Result<TriangleMesh, MeshError> {
    if (bytes.len() as u64) < BINARY_PREAMBLE_SIZE {
        return Err(MeshError::Malformed(format!(
            "binary STL shorter than the {}-byte preamble",
            BINARY_PREAMBLE_SIZE
        )));
    }

    let mut cursor = Cursor::new(bytes);
    cursor.set_position(80); // header is ignored
    let num_triangles = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    if num_triangles == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let mut pool = VertexPool::new();
    let mut faces = Vec::with_capacity(num_triangles as usize);
    let mut normals = Vec::with_capacity(num_triangles as usize);

    for i in 0..num_triangles {
        let mut record = [0.0f64; 12];
        for value in record.iter_mut() {
            *value = cursor.read_f32::<LittleEndian>().map_err(|_| {
                MeshError::Malformed(format!(
                    "truncated triangle record {} of {}",
                    i, num_triangles
                ))
            })? as f64;
        }
        // 2-byte attribute count, ignored
        cursor.read_u16::<LittleEndian>().map_err(|_| {
            MeshError::Malformed(format!(
                "truncated triangle record {} of {}",
                i, num_triangles
            ))
        })?;

        normals.push(Vec3::new(record[0], record[1], record[2]));
        let i1 = pool.insert(Vec3::new(record[3], record[4], record[5]));
        let i2 = pool.insert(Vec3::new(record[6], record[7], record[8]));
        let i3 = pool.insert(Vec3::new(record[9], record[10], record[11]));
        faces.push([i1, i2, i3]);
    }

    debug!(
        "binary STL: {} triangles, {} distinct vertices",
        faces.len(),
        pool.len()
    );
    Ok(TriangleMesh {
        vertices: pool.into_vertices(),
        faces,
        normals,
    })
}

fn parse_ascii(bytes: &[u8]) -> Result<TriangleMesh, MeshError> {
    let text = String::from_utf8_lossy(bytes);

    let mut pool = VertexPool::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut current_normal: Option<Vec3> = None;
    let mut loop_vertices: Vec<usize> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        match parts[0].to_ascii_lowercase().as_str() {
            "facet" if parts.len() >= 5 && parts[1].eq_ignore_ascii_case("normal") => {
                current_normal = Some(Vec3::new(
                    parse_float(parts[2], line_no)?,
                    parse_float(parts[3], line_no)?,
                    parse_float(parts[4], line_no)?,
                ));
            }
            "vertex" => {
                if parts.len() < 4 {
                    return Err(MeshError::Malformed(format!(
                        "line {}: vertex needs three coordinates",
                        line_no + 1
                    )));
                }
                let v = Vec3::new(
                    parse_float(parts[1], line_no)?,
                    parse_float(parts[2], line_no)?,
                    parse_float(parts[3], line_no)?,
                );
                loop_vertices.push(pool.insert(v));
            }
            "endloop" => {
                // Normal and face are committed together so the tables
                // cannot drift apart on malformed loops.
                if loop_vertices.len() == 3 {
                    faces.push([loop_vertices[0], loop_vertices[1], loop_vertices[2]]);
                    normals.push(current_normal.take().unwrap_or(Vec3::ZERO));
                }
                loop_vertices.clear();
            }
            _ => {}
        }
    }

    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    debug!(
        "ascii STL: {} triangles, {} distinct vertices",
        faces.len(),
        pool.len()
    );
    Ok(TriangleMesh {
        vertices: pool.into_vertices(),
        faces,
        normals,
    })
}

fn parse_float(token: &str, line_no: usize) -> Result<f64, MeshError> {
    token.parse::<f64>().map_err(|_| {
        MeshError::Malformed(format!(
            "line {}: expected a number, found {:?}",
            line_no + 1,
            token
        ))
    })
}

fn truncated(_: std::io::Error) -> MeshError {
    MeshError::Malformed("truncated triangle count".to_string())
}

/// Serialize a mesh as binary STL
pub fn to_binary_bytes(mesh: &TriangleMesh) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        BINARY_PREAMBLE_SIZE as usize + mesh.triangle_count() * BINARY_RECORD_SIZE as usize,
    );
    let mut header = [0u8; 80];
    let tag = b"lamina binary STL";
    header[..tag.len()].copy_from_slice(tag);
    bytes.extend_from_slice(&header);
    bytes
        .write_u32::<LittleEndian>(mesh.triangle_count() as u32)
        .expect("write to Vec cannot fail");

    for (face, normal) in mesh.faces.iter().zip(&mesh.normals) {
        for &value in &[normal.x, normal.y, normal.z] {
            bytes
                .write_f32::<LittleEndian>(value as f32)
                .expect("write to Vec cannot fail");
        }
        for &idx in face {
            let v = mesh.vertices[idx];
            for &value in &[v.x, v.y, v.z] {
                bytes
                    .write_f32::<LittleEndian>(value as f32)
                    .expect("write to Vec cannot fail");
            }
        }
        bytes
            .write_u16::<LittleEndian>(0)
            .expect("write to Vec cannot fail");
    }
    bytes
}

/// Write a mesh to disk as binary STL
pub fn write_binary<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<(), MeshError> {
    fs::write(path, to_binary_bytes(mesh))?;
    Ok(())
}
