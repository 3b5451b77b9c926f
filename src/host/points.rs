//! In-memory point cloud.

use glam::Vec3;
use parking_lot::RwLock;
use tracing::debug;

use super::column::Access;
use super::store::{impl_store_host, Store};
use crate::core::{AttributeDataKind, AttributeHeader, Domain};
use crate::util::{ComponentVec, DataType, Error, Result};

/// Default point radius.
pub const DEFAULT_RADIUS: f32 = 0.05;

/// A point cloud held in memory.
///
/// The only collection is `points` (`co`, `radius`); the `position` and
/// `radius` layers view those fields.
pub struct MemoryPointCloud {
    store: RwLock<Store>,
}

impl MemoryPointCloud {
    /// Point cloud with the given positions and the default radius.
    pub fn from_positions(positions: &[Vec3]) -> Result<Self> {
        let mut store = Store::new(&[(Domain::Point, "points")]);
        store.resize_domain(Domain::Point, positions.len());

        let points = store
            .collection_mut("points")
            .ok_or_else(|| Error::CollectionNotFound("points".to_string()))?;
        let co = positions.iter().flat_map(|p| p.to_array()).collect();
        points.add_values("co", DataType::VEC3F, Access::ReadWrite, ComponentVec::Float(co))?;
        points.add_values(
            "radius",
            DataType::FLOAT32,
            Access::ReadWrite,
            ComponentVec::Float(vec![DEFAULT_RADIUS; positions.len()]),
        )?;

        store.add_alias_layer(
            AttributeHeader::new("position", AttributeDataKind::FloatVector, Domain::Point),
            "points",
            "co",
        )?;
        store.add_alias_layer(
            AttributeHeader::new("radius", AttributeDataKind::Float, Domain::Point),
            "points",
            "radius",
        )?;

        debug!("point cloud: {} points", positions.len());
        Ok(Self {
            store: RwLock::new(store),
        })
    }

    /// `nx` by `ny` points in the XY plane, `spacing` apart, starting at the origin.
    pub fn points_grid(nx: usize, ny: usize, spacing: f32) -> Result<Self> {
        let positions: Vec<Vec3> = (0..ny)
            .flat_map(|y| (0..nx).map(move |x| Vec3::new(x as f32, y as f32, 0.0) * spacing))
            .collect();
        Self::from_positions(&positions)
    }

    pub fn num_points(&self) -> usize {
        self.store.read().domain_len(Domain::Point)
    }

    /// Add a zero-initialized point attribute layer.
    pub fn add_attribute(&self, name: &str, data_kind: AttributeDataKind) -> Result<AttributeHeader> {
        debug!("add layer {name} ({data_kind})");
        self.store
            .write()
            .add_layer(AttributeHeader::new(name, data_kind, Domain::Point))
    }
}

impl_store_host!(MemoryPointCloud, |_| {});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttributeHost, CollectionLocator, PropertyHost};
    use crate::util::ComponentsMut;

    #[test]
    fn test_points_grid() {
        let cloud = MemoryPointCloud::points_grid(3, 2, 0.5).unwrap();
        assert_eq!(cloud.num_points(), 6);
        assert_eq!(cloud.attribute_names(), vec!["position", "radius"]);

        let mut co = [0.0f32; 18];
        cloud
            .read_field(&CollectionLocator::attribute("position"), "vector", ComponentsMut::Float(&mut co))
            .unwrap();
        assert_eq!(&co[3..6], &[0.5, 0.0, 0.0]);
        assert_eq!(&co[15..18], &[1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_point_layers() {
        let cloud = MemoryPointCloud::points_grid(2, 2, 1.0).unwrap();
        cloud.add_attribute("weight", AttributeDataKind::Float).unwrap();
        let layer = CollectionLocator::attribute("weight");
        assert_eq!(cloud.element_count(&layer).unwrap(), 4);
        assert_eq!(cloud.field_names(&layer).unwrap(), vec!["value"]);
        assert!(matches!(
            cloud.element_count(&"vertices".into()),
            Err(Error::CollectionNotFound(_))
        ));
    }
}
