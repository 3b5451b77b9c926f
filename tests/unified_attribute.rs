//! Integration tests for unified attribute proxies over the in-memory hosts.

use std::f32::consts::PI;

use meshbuf::host::{EDGE_CREASE_LAYER, UV_LAYER, VERTEX_CREASE_LAYER};
use meshbuf::prelude::*;

const CUBE: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

fn cube_with(f: impl Fn(Vec3) -> Vec3) -> Vec<f32> {
    CUBE.iter()
        .flat_map(|v| f(Vec3::from_array(*v)).to_array())
        .collect()
}

fn assert_close(actual: &[f32], expected: &[f32], tol: f32) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= tol, "component {i}: {a} != {e} (tol {tol})");
    }
}

/// A row multiplied by a z rotation of `angle` turns by `-angle`.
fn rotated_z(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = (-angle).sin_cos();
    Vec3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

fn xyz(values: &[f32]) -> Vec<f32> {
    values.chunks_exact(4).flat_map(|v| [v[0], v[1], v[2]]).collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_color_layer_resolution() {
    let mesh = MemoryMesh::cube().unwrap();
    mesh.add_vertex_colors("ACol").unwrap();

    let err = UnifiedAttributeProxy::new(&mesh, "UNKNOWN", Some("color_srgb")).unwrap_err();
    assert!(matches!(err, Error::UnknownAttribute(_)));
    assert!(err.to_string().contains("unknown property"));

    let err = UnifiedAttributeProxy::new(&mesh, "ACol", Some("UNKNOWN")).unwrap_err();
    assert!(matches!(err, Error::UnknownAttribute(_)));
    assert!(err.to_string().contains("does not have an attribute"));

    let proxy = UnifiedAttributeProxy::new(&mesh, "ACol", Some("color_srgb")).unwrap();
    assert_eq!(proxy.len(), 6);
    assert_eq!(proxy.field(), "color_srgb");
    assert_eq!(proxy.domain(), Domain::Corner);
    assert_eq!(proxy.data_kind(), AttributeDataKind::ByteColor);
    assert!(proxy.is_corner());
}

#[test]
fn test_selectors() {
    let mesh = MemoryMesh::plane().unwrap();

    let proxy = UnifiedAttributeProxy::new(&mesh, UV_LAYER, None).unwrap();
    assert_eq!(proxy.field(), "vector");

    assert!(matches!(
        UnifiedAttributeProxy::new(&mesh, "Can I haz cheezeburger?", None),
        Err(Error::UnknownAttribute(_))
    ));

    let index = mesh
        .attribute_names()
        .iter()
        .position(|n| n == UV_LAYER)
        .expect("plane has a uv layer");
    let proxy = UnifiedAttributeProxy::new(&mesh, index, None).unwrap();
    assert_eq!(proxy.name(), UV_LAYER);

    let by_index = UnifiedAttributeProxy::new(&mesh, 120usize, None).unwrap_err();
    let by_name = UnifiedAttributeProxy::new(&mesh, "nope", None).unwrap_err();
    assert!(matches!(by_index, Error::UnknownAttribute(_)));
    assert_ne!(by_index.to_string(), by_name.to_string());

    let header = mesh.attribute_by_name(UV_LAYER).unwrap();
    let proxy = UnifiedAttributeProxy::new(&mesh, &header, None).unwrap();
    assert_eq!(proxy.header(), &header);

    assert!(matches!(
        UnifiedAttributeProxy::new(&mesh, header, Some("UVMap")),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_unsupported_layers() {
    let mesh = MemoryMesh::cube().unwrap();
    mesh.add_attribute("curvy", AttributeDataKind::Float, Domain::Curve)
        .unwrap();
    mesh.add_layer(
        AttributeHeader::new("single", AttributeDataKind::Float, Domain::Point)
            .with_storage(StorageKind::Single),
    )
    .unwrap();

    assert!(matches!(
        UnifiedAttributeProxy::new(&mesh, "curvy", None),
        Err(Error::DomainNotSupported(_))
    ));
    assert!(matches!(
        UnifiedAttributeProxy::new(&mesh, "single", None),
        Err(Error::StorageNotSupported(_))
    ));
}

// ============================================================================
// Face-corner layers
// ============================================================================

#[test]
fn test_corner_color_grey_levels() {
    let mesh = MemoryMesh::cube().unwrap();
    mesh.add_vertex_colors("ACol").unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, "ACol", Some("color_srgb")).unwrap();

    for (index, loops) in proxy.iter_mut::<f32>().unwrap().enumerate() {
        let grey = index as f32 / 6.0;
        for rgba in loops.chunks_exact_mut(4) {
            rgba.copy_from_slice(&[grey, grey, grey, 1.0]);
        }
    }
    proxy.set().unwrap();

    let original = proxy.values().snapshot::<f32>().unwrap();
    proxy.values_mut().release();
    proxy.get().unwrap();

    // byte colors come back quantized
    assert_close(proxy.values().as_slice::<f32>().unwrap(), original.as_slice(), 0.01);
    for (index, loops) in proxy.iter::<f32>().unwrap().enumerate() {
        assert_eq!(loops.len(), 16);
        let grey = index as f32 / 6.0;
        assert!(loops.chunks_exact(4).all(|c| (c[0] - grey).abs() < 0.01 && c[3] == 1.0));
    }
}

#[test]
fn test_uv_map_face_window() {
    let mesh = MemoryMesh::plane().unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, UV_LAYER, None).unwrap();
    assert_eq!(proxy.len(), 1);
    proxy.get().unwrap();

    let square = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    assert_eq!(proxy.item::<f32>(0).unwrap(), &square);

    // the window is a live view into the buffer
    proxy.item_mut::<f32>(0).unwrap().iter_mut().for_each(|c| *c *= 0.5);
    proxy.set().unwrap();
    proxy.values_mut().release();
    proxy.get().unwrap();
    assert_eq!(
        proxy.item::<f32>(0).unwrap(),
        &[0.0, 0.0, 0.5, 0.0, 0.5, 0.5, 0.0, 0.5]
    );

    assert!(matches!(
        proxy.set_item(1, &[0.0f32]),
        Err(Error::IndexOutOfRange { index: 1, count: 1 })
    ));

    proxy.set_item(0, &square).unwrap();
    proxy.set().unwrap();
    proxy.values_mut().release();
    proxy.get().unwrap();
    assert_eq!(proxy.item::<f32>(0).unwrap(), &square);
}

#[test]
fn test_corner_set_item_broadcast() {
    let mesh = MemoryMesh::cube().unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, UV_LAYER, None).unwrap();

    proxy.set_item(2, &[0.25f32]).unwrap();
    assert_eq!(proxy.item::<f32>(2).unwrap(), &[0.25; 8]);

    proxy.set_item(3, &[0.5f32, 0.75]).unwrap();
    assert_eq!(
        proxy.item::<f32>(3).unwrap(),
        &[0.5, 0.75, 0.5, 0.75, 0.5, 0.75, 0.5, 0.75]
    );

    assert!(matches!(
        proxy.set_item(3, &[0.5f32, 0.75, 1.0]),
        Err(Error::ShapeMismatch(_))
    ));
    // neighbours are untouched
    assert_eq!(proxy.item::<f32>(4).unwrap(), &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
}

#[test]
fn test_non_uniform_corner_counts() {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
    ];
    let mesh = MemoryMesh::from_polygons(&positions, &[&[0, 1, 2, 3], &[1, 4, 2]]).unwrap();
    mesh.add_attribute("w", AttributeDataKind::Float, Domain::Corner)
        .unwrap();

    let mut proxy = UnifiedAttributeProxy::new(&mesh, "w", None).unwrap();
    assert_eq!(proxy.len(), 2);
    assert_eq!(proxy.rows(0).unwrap(), 0..4);
    assert_eq!(proxy.rows(1).unwrap(), 4..7);

    for (face, loops) in proxy.iter_mut::<f32>().unwrap().enumerate() {
        loops.fill(face as f32 + 1.0);
    }
    proxy.set().unwrap();
    proxy.get().unwrap();
    assert_eq!(
        proxy.values().as_slice::<f32>().unwrap(),
        &[1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]
    );
    assert_eq!(proxy.item::<f32>(1).unwrap().len(), 3);
}

#[test]
fn test_loop_table_out_of_bounds() {
    let mesh = MemoryMesh::cube().unwrap();
    let mut loop_start = BufferProxy::new(&mesh, "polygons", "loop_start");
    loop_start.get().unwrap();
    assert_eq!(loop_start.as_slice::<i32>().unwrap(), &[0, 4, 8, 12, 16, 20]);

    // last face reaches two loops past the end
    loop_start.set_item(5, &[22i32]).unwrap();
    loop_start.set().unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, UV_LAYER, None).unwrap();
    assert!(matches!(
        proxy.item::<f32>(5),
        Err(Error::IndexOutOfRange { index: 26, count: 24 })
    ));
    assert!(matches!(proxy.iter::<f32>(), Err(Error::IndexOutOfRange { .. })));
    assert_eq!(proxy.item::<f32>(4).unwrap().len(), 8);

    loop_start.set_item(5, &[-1i32]).unwrap();
    loop_start.set().unwrap();
    proxy.get().unwrap();
    let err = proxy.item::<f32>(5).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch(_)));
    assert!(err.to_string().contains("negative loop start -1"));
    assert!(matches!(proxy.set_item(5, &[0.0f32]), Err(Error::ShapeMismatch(_))));

    // face 1 reuses the loops of face 0
    loop_start.set_item(5, &[20i32]).unwrap();
    loop_start.set_item(1, &[0i32]).unwrap();
    loop_start.set().unwrap();
    proxy.get().unwrap();
    assert_eq!(proxy.iter::<f32>().unwrap().count(), 6);
    assert_eq!(proxy.rows(1).unwrap(), 0..4);
    assert!(matches!(proxy.iter_mut::<f32>(), Err(Error::ShapeMismatch(_))));
}

#[test]
fn test_failed_set_leaves_host_untouched() {
    let mesh = MemoryMesh::cube().unwrap();
    mesh.add_attribute("n", AttributeDataKind::FloatVector, Domain::Corner)
        .unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, "n", None).unwrap();
    proxy.extend(true).unwrap();

    // the host's loop table changes after the proxy read it
    let mut loop_start = BufferProxy::new(&mesh, "polygons", "loop_start");
    loop_start.get().unwrap();
    loop_start.set_item(0, &[4i32]).unwrap();
    loop_start.set().unwrap();

    assert!(matches!(proxy.set(), Err(Error::ShapeMismatch(_))));
    loop_start.release();
    loop_start.get().unwrap();
    assert_eq!(loop_start.item::<i32>(0).unwrap(), &[4]);

    proxy.discard().unwrap();
    proxy.set().unwrap();
    loop_start.get().unwrap();
    assert_eq!(loop_start.item::<i32>(0).unwrap(), &[0]);
}

// ============================================================================
// Point, edge and face layers
// ============================================================================

#[test]
fn test_edge_crease() {
    let mesh = MemoryMesh::cube().unwrap();
    mesh.edge_creases_ensure().unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, EDGE_CREASE_LAYER, None).unwrap();
    assert_eq!(proxy.len(), 12);
    assert!(!proxy.is_corner());

    for crease in proxy.iter_mut::<f32>().unwrap() {
        crease.fill(1.0);
    }
    proxy.set().unwrap();

    let original = proxy.values().snapshot::<f32>().unwrap();
    proxy.values_mut().release();
    proxy.get().unwrap();
    assert_eq!(proxy.values().as_slice::<f32>().unwrap(), original.as_slice());
    assert_eq!(original.as_slice(), &[1.0; 12]);
}

#[test]
fn test_vertex_crease_indexing() {
    let mesh = MemoryMesh::cube().unwrap();
    mesh.vertex_creases_ensure().unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, VERTEX_CREASE_LAYER, None).unwrap();

    for i in 0..proxy.len() {
        assert_eq!(proxy.item::<f32>(i).unwrap(), &[0.0]);
        proxy.set_item(i, &[1.0f32]).unwrap();
    }
    assert!(proxy.values().as_slice::<f32>().unwrap().iter().all(|&c| c == 1.0));
    assert!(matches!(
        proxy.item::<f32>(8),
        Err(Error::IndexOutOfRange { index: 8, count: 8 })
    ));

    proxy.set().unwrap();
    proxy.values_mut().release();
    proxy.get().unwrap();
    assert_eq!(proxy.values().as_slice::<f32>().unwrap(), &[1.0; 8]);
}

#[test]
fn test_face_layer() {
    let mesh = MemoryMesh::cube().unwrap();
    mesh.add_attribute("oink", AttributeDataKind::Float, Domain::Face)
        .unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, "oink", None).unwrap();
    assert_eq!(proxy.len(), 6);

    for value in proxy.iter_mut::<f32>().unwrap() {
        value.fill(1.0);
    }
    proxy.set().unwrap();
    proxy.values_mut().release();
    proxy.get().unwrap();
    assert_eq!(proxy.values().as_slice::<f32>().unwrap(), &[1.0; 6]);
}

// ============================================================================
// Vector operations
// ============================================================================

#[test]
fn test_position_matmul() {
    let mesh = MemoryMesh::cube().unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, "position", None).unwrap();
    assert_eq!(proxy.len(), 8);
    proxy.extend(false).unwrap();

    let rotation = Mat4::from_rotation_z(PI / 4.0);
    let result = proxy.matmul(rotation).unwrap();
    assert_close(
        &xyz(result.as_slice()),
        &cube_with(|v| rotated_z(v, PI / 4.0)),
        1e-6,
    );
    assert_close(&xyz(proxy.values().as_slice::<f32>().unwrap()), &cube_with(|v| v), 0.0);
}

#[test]
fn test_position_extend_rotate_discard_set() {
    let mesh = MemoryMesh::cube().unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, "position", None).unwrap();
    proxy.extend(false).unwrap();

    let rotation = Mat4::from_rotation_z(PI / 4.0);
    let len = proxy.matmul_assign(rotation).unwrap().len();
    assert_eq!(len, 8);
    let expected = cube_with(|v| rotated_z(v, PI / 4.0));
    assert_close(&xyz(proxy.values().as_slice::<f32>().unwrap()), &expected, 1e-6);

    assert!(matches!(proxy.set(), Err(Error::ShapeMismatch(_))));
    proxy.discard().unwrap();
    proxy.set().unwrap();

    let original = proxy.values().snapshot::<f32>().unwrap();
    proxy.values_mut().release();
    proxy.get().unwrap();
    assert_eq!(proxy.values().as_slice::<f32>().unwrap(), original.as_slice());

    // the layer aliases the vertex coordinates
    let mut co = BufferProxy::new(&mesh, "vertices", "co");
    co.get().unwrap();
    assert_close(co.as_slice::<f32>().unwrap(), &expected, 1e-6);
}

#[test]
fn test_point_cloud_position() {
    let cloud = MemoryPointCloud::points_grid(5, 4, 0.25).unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&cloud, "position", None).unwrap();
    assert_eq!(proxy.len(), 20);
    let before = proxy.values().snapshot::<f32>().unwrap();

    proxy.extend(false).unwrap();
    let rotation = Mat4::from_rotation_z(PI / 4.0);
    proxy.matmul_assign(rotation).unwrap();
    for (point, original) in proxy.iter::<f32>().unwrap().zip(before.rows()) {
        let expected = rotated_z(Vec3::from_slice(original), PI / 4.0);
        assert_close(&point[..3], &expected.to_array(), 1e-6);
        assert_eq!(point[3], 1.0);
    }

    proxy.discard().unwrap();
    proxy.set().unwrap();
    let original = proxy.values().snapshot::<f32>().unwrap();
    proxy.values_mut().release();
    proxy.get().unwrap();
    assert_eq!(proxy.values().as_slice::<f32>().unwrap(), original.as_slice());
}

#[test]
fn test_position_arithmetic() {
    let mesh = MemoryMesh::cube().unwrap();
    let mut proxy = UnifiedAttributeProxy::new(&mesh, "position", None).unwrap();

    let result = proxy.add(1.0f32).unwrap();
    assert_close(result.as_slice(), &cube_with(|v| v + Vec3::ONE), 0.0);
    let result = proxy.sub(1.0f32).unwrap();
    assert_close(result.as_slice(), &cube_with(|v| v - Vec3::ONE), 0.0);
    let result = proxy.mul(2.0f32).unwrap();
    assert_close(result.as_slice(), &cube_with(|v| v * 2.0), 0.0);
    let result = proxy.div(2.0).unwrap();
    assert_close(result.as_slice(), &cube_with(|v| v / 2.0), 0.0);
    // copy forms leave the buffer alone
    assert_close(proxy.values().as_slice::<f32>().unwrap(), &cube_with(|v| v), 0.0);

    proxy.add_assign(1.0f32).unwrap();
    assert_close(proxy.values().as_slice::<f32>().unwrap(), &cube_with(|v| v + Vec3::ONE), 0.0);
    proxy.sub_assign(1.0f32).unwrap();
    proxy.mul_assign(2.0f32).unwrap();
    assert_close(proxy.values().as_slice::<f32>().unwrap(), &cube_with(|v| v * 2.0), 0.0);
    proxy.div_assign(2.0).unwrap();
    assert_close(proxy.values().as_slice::<f32>().unwrap(), &cube_with(|v| v), 0.0);
}
