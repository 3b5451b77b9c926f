//! In-memory polygon mesh.

use std::collections::HashMap;

use glam::Vec3;
use parking_lot::RwLock;
use tracing::debug;

use super::column::{Access, ElementTable};
use super::store::{impl_store_host, Store};
use crate::core::{AttributeDataKind, AttributeHeader, Domain};
use crate::util::{ComponentVec, DataType, Error, Result};

/// Layer created by [`MemoryMesh::vertex_creases_ensure`].
pub const VERTEX_CREASE_LAYER: &str = "crease_vert";
/// Layer created by [`MemoryMesh::edge_creases_ensure`].
pub const EDGE_CREASE_LAYER: &str = "crease_edge";
/// UV layer of the primitives.
pub const UV_LAYER: &str = "UVMap";

const DOMAINS: [(Domain, &str); 4] = [
    (Domain::Point, "vertices"),
    (Domain::Edge, "edges"),
    (Domain::Face, "polygons"),
    (Domain::Corner, "loops"),
];

const CUBE_POSITIONS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

const CUBE_FACES: [[u32; 4]; 6] = [
    [0, 4, 6, 2],
    [3, 2, 6, 7],
    [7, 6, 4, 5],
    [5, 1, 3, 7],
    [1, 0, 2, 3],
    [5, 4, 0, 1],
];

const PLANE_POSITIONS: [[f32; 3]; 4] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
];

const QUAD_UVS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

/// A polygon mesh held in memory.
///
/// Collections are `vertices` (`co`, `hide`, `select`), `edges`
/// (`vertices`, `hide`, `select`), `polygons` (`loop_start`,
/// `loop_total`, `hide`, `select`, `material_index` and the read-only
/// `area`) and `loops` (`vertex_index`, `edge_index`). The `position`
/// layer views `vertices.co`.
pub struct MemoryMesh {
    store: RwLock<Store>,
}

impl MemoryMesh {
    /// Mesh with no elements.
    pub fn new() -> Result<Self> {
        Self::from_polygons(&[], &[])
    }

    /// Build a mesh from vertex positions and faces given as vertex indices.
    ///
    /// Edges are derived from the face outlines in order of appearance.
    pub fn from_polygons(positions: &[Vec3], faces: &[&[u32]]) -> Result<Self> {
        let mut edge_keys: HashMap<(u32, u32), i32> = HashMap::new();
        let mut edges: Vec<i32> = Vec::new();
        let mut loop_vertex = Vec::new();
        let mut loop_edge = Vec::new();
        let mut loop_start = Vec::with_capacity(faces.len());
        let mut loop_total = Vec::with_capacity(faces.len());

        for (face_index, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(Error::InvalidArgument(format!(
                    "face {face_index} has {} vertices, need at least 3",
                    face.len()
                )));
            }
            loop_start.push(loop_vertex.len() as i32);
            loop_total.push(face.len() as i32);
            for (i, &a) in face.iter().enumerate() {
                let b = face[(i + 1) % face.len()];
                if a as usize >= positions.len() {
                    return Err(Error::IndexOutOfRange {
                        index: a as usize,
                        count: positions.len(),
                    });
                }
                let key = (a.min(b), a.max(b));
                let edge = *edge_keys.entry(key).or_insert_with(|| {
                    edges.extend_from_slice(&[key.0 as i32, key.1 as i32]);
                    (edges.len() / 2 - 1) as i32
                });
                loop_vertex.push(a as i32);
                loop_edge.push(edge);
            }
        }

        let mut store = Store::new(&DOMAINS);
        store.resize_domain(Domain::Point, positions.len());
        store.resize_domain(Domain::Edge, edges.len() / 2);
        store.resize_domain(Domain::Face, faces.len());
        store.resize_domain(Domain::Corner, loop_vertex.len());

        let co = positions.iter().flat_map(|p| p.to_array()).collect();
        let vertices = table(&mut store, "vertices")?;
        vertices.add_values("co", DataType::VEC3F, Access::ReadWrite, ComponentVec::Float(co))?;
        vertices.add_column("hide", DataType::BOOL, Access::ReadWrite)?;
        vertices.add_column("select", DataType::BOOL, Access::ReadWrite)?;

        let edge_table = table(&mut store, "edges")?;
        edge_table.add_values("vertices", DataType::VEC2I, Access::ReadWrite, ComponentVec::Int(edges))?;
        edge_table.add_column("hide", DataType::BOOL, Access::ReadWrite)?;
        edge_table.add_column("select", DataType::BOOL, Access::ReadWrite)?;

        let polygons = table(&mut store, "polygons")?;
        polygons.add_values("loop_start", DataType::INT32, Access::ReadWrite, ComponentVec::Int(loop_start))?;
        polygons.add_values("loop_total", DataType::INT32, Access::ReadWrite, ComponentVec::Int(loop_total))?;
        polygons.add_column("hide", DataType::BOOL, Access::ReadWrite)?;
        polygons.add_column("select", DataType::BOOL, Access::ReadWrite)?;
        polygons.add_column("material_index", DataType::INT32, Access::ReadWrite)?;
        polygons.add_column("area", DataType::FLOAT32, Access::ReadOnly)?;

        let loops = table(&mut store, "loops")?;
        loops.add_values("vertex_index", DataType::INT32, Access::ReadWrite, ComponentVec::Int(loop_vertex))?;
        loops.add_values("edge_index", DataType::INT32, Access::ReadWrite, ComponentVec::Int(loop_edge))?;

        store.add_alias_layer(
            AttributeHeader::new("position", AttributeDataKind::FloatVector, Domain::Point),
            "vertices",
            "co",
        )?;
        update_face_areas(&mut store);

        debug!(
            "mesh: {} vertices, {} edges, {} faces, {} loops",
            store.domain_len(Domain::Point),
            store.domain_len(Domain::Edge),
            store.domain_len(Domain::Face),
            store.domain_len(Domain::Corner)
        );
        Ok(Self {
            store: RwLock::new(store),
        })
    }

    /// Cube of size 2 centered at the origin, with a UV layer.
    pub fn cube() -> Result<Self> {
        let positions: Vec<Vec3> = CUBE_POSITIONS.iter().map(|p| Vec3::from_array(*p)).collect();
        let faces: Vec<&[u32]> = CUBE_FACES.iter().map(|f| f.as_slice()).collect();
        let mesh = Self::from_polygons(&positions, &faces)?;
        mesh.add_quad_uvs()?;
        Ok(mesh)
    }

    /// Single quad of size 2 in the XY plane, with a UV layer.
    pub fn plane() -> Result<Self> {
        let positions: Vec<Vec3> = PLANE_POSITIONS.iter().map(|p| Vec3::from_array(*p)).collect();
        let mesh = Self::from_polygons(&positions, &[&[0, 1, 3, 2]])?;
        mesh.add_quad_uvs()?;
        Ok(mesh)
    }

    /// UV layer mapping every face onto the unit square.
    fn add_quad_uvs(&self) -> Result<()> {
        self.add_attribute(UV_LAYER, AttributeDataKind::Float2, Domain::Corner)?;
        let mut store = self.store.write();
        let faces = store.domain_len(Domain::Face);
        let uvs: Vec<f32> = (0..faces).flat_map(|_| QUAD_UVS).collect();
        let column = store
            .layer_column_mut(UV_LAYER, "vector")
            .ok_or_else(|| Error::missing_field(UV_LAYER, "vector"))?;
        let dst = column.values_mut().as_slice_mut::<f32>()?;
        if dst.len() != uvs.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} uv components for {} loops",
                uvs.len(),
                dst.len() / 2
            )));
        }
        dst.copy_from_slice(&uvs);
        Ok(())
    }

    pub fn num_vertices(&self) -> usize {
        self.store.read().domain_len(Domain::Point)
    }

    pub fn num_edges(&self) -> usize {
        self.store.read().domain_len(Domain::Edge)
    }

    pub fn num_faces(&self) -> usize {
        self.store.read().domain_len(Domain::Face)
    }

    pub fn num_loops(&self) -> usize {
        self.store.read().domain_len(Domain::Corner)
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Add a zero-initialized attribute layer.
    pub fn add_attribute(
        &self,
        name: &str,
        data_kind: AttributeDataKind,
        domain: Domain,
    ) -> Result<AttributeHeader> {
        self.add_layer(AttributeHeader::new(name, data_kind, domain))
    }

    /// Add a layer described by a header, including its storage kind.
    pub fn add_layer(&self, header: AttributeHeader) -> Result<AttributeHeader> {
        debug!("add layer {} ({} {})", header.name, header.domain, header.data_kind);
        self.store.write().add_layer(header)
    }

    fn ensure(&self, name: &str, domain: Domain) -> Result<AttributeHeader> {
        if let Some(header) = self.store.read().layer_header(name) {
            return Ok(header.clone());
        }
        self.add_attribute(name, AttributeDataKind::Float, domain)
    }

    /// The vertex crease layer, created on first use.
    pub fn vertex_creases_ensure(&self) -> Result<AttributeHeader> {
        self.ensure(VERTEX_CREASE_LAYER, Domain::Point)
    }

    /// The edge crease layer, created on first use.
    pub fn edge_creases_ensure(&self) -> Result<AttributeHeader> {
        self.ensure(EDGE_CREASE_LAYER, Domain::Edge)
    }

    /// Add a byte color layer on face corners.
    ///
    /// Colors are stored with 8 bits per channel, so written values come
    /// back rounded to the nearest multiple of 1/255.
    pub fn add_vertex_colors(&self, name: &str) -> Result<AttributeHeader> {
        self.add_attribute(name, AttributeDataKind::ByteColor, Domain::Corner)
    }

    // ========================================================================
    // Topology
    // ========================================================================

    /// Append loose vertices.
    pub fn add_vertices(&self, positions: &[Vec3]) -> Result<()> {
        let mut store = self.store.write();
        let first = store.domain_len(Domain::Point);
        store.resize_domain(Domain::Point, first + positions.len());

        let co = table(&mut store, "vertices")?
            .column_mut("co")
            .ok_or_else(|| Error::missing_field("vertices", "co"))?
            .values_mut()
            .as_slice_mut::<f32>()?;
        for (dst, p) in co[first * 3..].chunks_exact_mut(3).zip(positions) {
            dst.copy_from_slice(&p.to_array());
        }
        debug!("added {} vertices", positions.len());
        Ok(())
    }

    /// Remove every element (and with them all layer values).
    pub fn delete_all(&self) {
        let mut store = self.store.write();
        for (domain, _) in DOMAINS {
            store.resize_domain(domain, 0);
        }
        debug!("deleted all elements");
    }
}

impl_store_host!(MemoryMesh, update_face_areas);

fn table<'s>(store: &'s mut Store, name: &str) -> Result<&'s mut ElementTable> {
    store
        .collection_mut(name)
        .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
}

/// Recompute `polygons.area` from the current vertex positions.
fn update_face_areas(store: &mut Store) {
    let Some(areas) = face_areas(store) else {
        return;
    };
    let area = store
        .collection_mut("polygons")
        .and_then(|t| t.column_mut("area"))
        .and_then(|c| c.values_mut().as_slice_mut::<f32>().ok());
    if let Some(area) = area {
        if area.len() == areas.len() {
            area.copy_from_slice(&areas);
        }
    }
}

fn face_areas(store: &Store) -> Option<Vec<f32>> {
    let ints = |collection: &str, field: &str| {
        store
            .collection(collection)?
            .column(field)?
            .values()
            .as_slice::<i32>()
            .ok()
    };
    let start = ints("polygons", "loop_start")?;
    let total = ints("polygons", "loop_total")?;
    let corners = ints("loops", "vertex_index")?;
    let co = store
        .collection("vertices")?
        .column("co")?
        .values()
        .as_slice::<f32>()
        .ok()?;

    let position = |loop_index: usize| -> Option<Vec3> {
        let v = usize::try_from(*corners.get(loop_index)?).ok()?;
        co.get(v * 3..v * 3 + 3).map(Vec3::from_slice)
    };

    start
        .iter()
        .zip(total)
        .map(|(&start, &total)| {
            let (start, total) = (start as usize, total as usize);
            let mut normal = Vec3::ZERO;
            for i in 0..total {
                let a = position(start + i)?;
                let b = position(start + (i + 1) % total)?;
                normal += a.cross(b);
            }
            Some(normal.length() * 0.5)
        })
        .collect()
}
