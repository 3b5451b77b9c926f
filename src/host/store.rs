//! Element tables plus an attribute layer registry.
//!
//! Both in-memory hosts are a [`Store`] behind a lock. Named collections
//! map one-to-one onto tables. Attribute layers either own a table sized
//! to their domain, or alias a field of a named collection (a mesh's
//! `position` layer is `vertices.co`).

use tracing::trace;

use super::column::{Access, ElementTable, FieldColumn};
use crate::core::{
    AttributeDataKind, AttributeHeader, CollectionLocator, Domain, ATTRIBUTES_COLLECTION,
};
use crate::util::{Components, ComponentsMut, DataType, Error, Result};

#[derive(Clone, Debug)]
enum LayerSource {
    Owned(ElementTable),
    /// Field `field` of the layer is field `target` of `collection`.
    Alias {
        collection: String,
        field: String,
        target: String,
    },
}

#[derive(Clone, Debug)]
struct Layer {
    header: AttributeHeader,
    source: LayerSource,
}

/// Which table a (locator, field) pair resolves to.
#[derive(Clone, Copy)]
enum TableRef {
    Collection(usize),
    Layer(usize),
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Store {
    collections: Vec<(String, ElementTable)>,
    layers: Vec<Layer>,
    domains: Vec<(Domain, &'static str)>,
}

impl Store {
    /// Empty store; `domains` maps attribute domains onto named collections.
    pub fn new(domains: &[(Domain, &'static str)]) -> Self {
        Self {
            collections: domains
                .iter()
                .map(|(_, name)| (name.to_string(), ElementTable::new(0)))
                .collect(),
            layers: Vec::new(),
            domains: domains.to_vec(),
        }
    }

    // ========================================================================
    // Collections
    // ========================================================================

    pub fn collection(&self, name: &str) -> Option<&ElementTable> {
        self.collections.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn collection_mut(&mut self, name: &str) -> Option<&mut ElementTable> {
        self.collections.iter_mut().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Names of all collections.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|(n, _)| n.as_str())
    }

    fn domain_collection(&self, domain: Domain) -> Option<&'static str> {
        self.domains.iter().find(|(d, _)| *d == domain).map(|(_, n)| *n)
    }

    /// Number of elements of a domain; 0 for domains this host lacks.
    pub fn domain_len(&self, domain: Domain) -> usize {
        self.domain_collection(domain)
            .and_then(|name| self.collection(name))
            .map_or(0, ElementTable::len)
    }

    /// Resize the collection backing a domain and every layer owned by it.
    pub fn resize_domain(&mut self, domain: Domain, len: usize) {
        if let Some(table) = self
            .domain_collection(domain)
            .and_then(|name| self.collection_mut(name))
        {
            table.resize(len);
        }
        for layer in self.layers.iter_mut().filter(|l| l.header.domain == domain) {
            if let LayerSource::Owned(table) = &mut layer.source {
                table.resize(len);
            }
        }
    }

    // ========================================================================
    // Layers
    // ========================================================================

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_header(&self, name: &str) -> Option<&AttributeHeader> {
        self.layers
            .iter()
            .find(|l| l.header.name == name)
            .map(|l| &l.header)
    }

    pub fn layer_at(&self, index: usize) -> Option<&AttributeHeader> {
        self.layers.get(index).map(|l| &l.header)
    }

    /// Register a layer with its own zeroed storage.
    ///
    /// The value field is named after the data kind's default; color
    /// layers also get a `color_srgb` field. Byte colors are quantized.
    pub fn add_layer(&mut self, header: AttributeHeader) -> Result<AttributeHeader> {
        self.check_new_layer(&header.name)?;
        let kind = header.data_kind;
        if kind == AttributeDataKind::String {
            return Err(Error::other(format!(
                "cannot create string layer {}: strings cannot be stored",
                header.name
            )));
        }

        let access = match kind {
            AttributeDataKind::ByteColor => Access::Quantized,
            _ => Access::ReadWrite,
        };
        let mut table = ElementTable::new(self.domain_len(header.domain));
        table.add_column(kind.default_field(), kind.data_type(), access)?;
        if matches!(kind, AttributeDataKind::ByteColor | AttributeDataKind::FloatColor) {
            table.add_column("color_srgb", kind.data_type(), access)?;
        }

        self.layers.push(Layer {
            header: header.clone(),
            source: LayerSource::Owned(table),
        });
        Ok(header)
    }

    /// Register a layer that views a field of a named collection.
    pub fn add_alias_layer(
        &mut self,
        header: AttributeHeader,
        collection: &str,
        target: &str,
    ) -> Result<AttributeHeader> {
        self.check_new_layer(&header.name)?;
        let table = self
            .collection(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        if table.column(target).is_none() {
            return Err(Error::FieldNotFound {
                collection: collection.to_string(),
                field: target.to_string(),
            });
        }
        self.layers.push(Layer {
            source: LayerSource::Alias {
                collection: collection.to_string(),
                field: header.default_field().to_string(),
                target: target.to_string(),
            },
            header: header.clone(),
        });
        Ok(header)
    }

    fn check_new_layer(&self, name: &str) -> Result<()> {
        if self.layer_header(name).is_some() {
            return Err(Error::InvalidArgument(format!(
                "attribute layer {name} already exists"
            )));
        }
        Ok(())
    }

    /// Column of a layer with its own storage, bypassing its access mode.
    pub fn layer_column_mut(&mut self, name: &str, field: &str) -> Option<&mut FieldColumn> {
        match &mut self.layers.iter_mut().find(|l| l.header.name == name)?.source {
            LayerSource::Owned(table) => table.column_mut(field),
            LayerSource::Alias { .. } => None,
        }
    }

    // ========================================================================
    // Locator resolution
    // ========================================================================

    fn find_collection(&self, name: &str) -> Result<usize> {
        self.collections
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    fn find_layer(&self, locator: &CollectionLocator) -> Result<Option<usize>> {
        match locator {
            CollectionLocator::Named(_) => Ok(None),
            CollectionLocator::Keyed { collection, key } if collection == ATTRIBUTES_COLLECTION => {
                self.layers
                    .iter()
                    .position(|l| l.header.name == *key)
                    .map(Some)
                    .ok_or_else(|| Error::CollectionNotFound(locator.to_string()))
            }
            CollectionLocator::Keyed { .. } => Err(Error::CollectionNotFound(locator.to_string())),
        }
    }

    /// Resolve a locator to the table holding its elements.
    fn locate(&self, locator: &CollectionLocator) -> Result<TableRef> {
        match (self.find_layer(locator)?, locator) {
            (None, CollectionLocator::Named(name)) => {
                Ok(TableRef::Collection(self.find_collection(name)?))
            }
            (None, _) => Err(Error::CollectionNotFound(locator.to_string())),
            (Some(index), _) => match &self.layers[index].source {
                LayerSource::Owned(_) => Ok(TableRef::Layer(index)),
                LayerSource::Alias { collection, .. } => {
                    Ok(TableRef::Collection(self.find_collection(collection)?))
                }
            },
        }
    }

    /// Resolve a locator and field to a table and the field's column name.
    fn resolve(&self, locator: &CollectionLocator, field: &str) -> Result<(TableRef, String)> {
        let table = self.locate(locator)?;
        let alias = self
            .find_layer(locator)?
            .and_then(|i| match &self.layers[i].source {
                LayerSource::Alias { field: alias, target, .. } => Some((alias, target)),
                LayerSource::Owned(_) => None,
            });
        match alias {
            None => Ok((table, field.to_string())),
            Some((alias, target)) if alias == field => Ok((table, target.clone())),
            Some(_) => Err(Error::FieldNotFound {
                collection: locator.to_string(),
                field: field.to_string(),
            }),
        }
    }

    fn table(&self, table: TableRef) -> Option<&ElementTable> {
        match table {
            TableRef::Collection(i) => self.collections.get(i).map(|(_, t)| t),
            TableRef::Layer(i) => match &self.layers.get(i)?.source {
                LayerSource::Owned(t) => Some(t),
                LayerSource::Alias { .. } => None,
            },
        }
    }

    fn table_mut(&mut self, table: TableRef) -> Option<&mut ElementTable> {
        match table {
            TableRef::Collection(i) => self.collections.get_mut(i).map(|(_, t)| t),
            TableRef::Layer(i) => match &mut self.layers.get_mut(i)?.source {
                LayerSource::Owned(t) => Some(t),
                LayerSource::Alias { .. } => None,
            },
        }
    }

    fn column(&self, locator: &CollectionLocator, field: &str) -> Result<&FieldColumn> {
        let (table, column) = self.resolve(locator, field)?;
        self.table(table)
            .and_then(|t| t.column(&column))
            .ok_or_else(|| Error::FieldNotFound {
                collection: locator.to_string(),
                field: field.to_string(),
            })
    }

    // ========================================================================
    // Transfer
    // ========================================================================

    pub fn element_count(&self, locator: &CollectionLocator) -> Result<usize> {
        let table = self.locate(locator)?;
        Ok(self.table(table).map_or(0, ElementTable::len))
    }

    /// Fields of a collection's elements.
    pub fn field_names(&self, locator: &CollectionLocator) -> Result<Vec<String>> {
        if let Some(index) = self.find_layer(locator)? {
            if let LayerSource::Alias { field, .. } = &self.layers[index].source {
                return Ok(vec![field.clone()]);
            }
        }
        let table = self.locate(locator)?;
        Ok(self
            .table(table)
            .map(|t| t.column_names().map(String::from).collect())
            .unwrap_or_default())
    }

    pub fn field_type(&self, locator: &CollectionLocator, field: &str) -> Result<DataType> {
        Ok(self.column(locator, field)?.data_type())
    }

    pub fn read_field(
        &self,
        locator: &CollectionLocator,
        field: &str,
        dst: ComponentsMut<'_>,
    ) -> Result<()> {
        trace!("host read {locator}.{field}");
        self.column(locator, field)?.read(dst)
    }

    pub fn write_field(
        &mut self,
        locator: &CollectionLocator,
        field: &str,
        src: Components<'_>,
    ) -> Result<()> {
        trace!("host write {locator}.{field}");
        let (table, column) = self.resolve(locator, field)?;
        self.table_mut(table)
            .and_then(|t| t.column_mut(&column))
            .ok_or_else(|| Error::FieldNotFound {
                collection: locator.to_string(),
                field: field.to_string(),
            })?
            .write(src)
    }
}

/// Implement the host traits for a type holding a `RwLock<Store>` in
/// `self.store`. `$after_write` runs with the write lock held after
/// every successful field write.
macro_rules! impl_store_host {
    ($ty:ty, $after_write:expr) => {
        impl $crate::core::PropertyHost for $ty {
            fn element_count(
                &self,
                locator: &$crate::core::CollectionLocator,
            ) -> $crate::util::Result<usize> {
                self.store.read().element_count(locator)
            }

            fn field_type(
                &self,
                locator: &$crate::core::CollectionLocator,
                field: &str,
            ) -> $crate::util::Result<$crate::util::DataType> {
                self.store.read().field_type(locator, field)
            }

            fn read_field(
                &self,
                locator: &$crate::core::CollectionLocator,
                field: &str,
                dst: $crate::util::ComponentsMut<'_>,
            ) -> $crate::util::Result<()> {
                self.store.read().read_field(locator, field, dst)
            }

            fn write_field(
                &self,
                locator: &$crate::core::CollectionLocator,
                field: &str,
                src: $crate::util::Components<'_>,
            ) -> $crate::util::Result<()> {
                let mut store = self.store.write();
                store.write_field(locator, field, src)?;
                let after: fn(&mut $crate::host::store::Store) = $after_write;
                after(&mut store);
                Ok(())
            }
        }

        impl $ty {
            /// Names of the named collections, in creation order.
            pub fn collection_names(&self) -> Vec<String> {
                self.store.read().collection_names().map(String::from).collect()
            }

            /// Fields of the elements of a collection or layer.
            pub fn field_names(
                &self,
                locator: &$crate::core::CollectionLocator,
            ) -> $crate::util::Result<Vec<String>> {
                self.store.read().field_names(locator)
            }
        }

        impl $crate::core::AttributeHost for $ty {
            fn num_attributes(&self) -> usize {
                self.store.read().num_layers()
            }

            fn attribute_by_name(&self, name: &str) -> Option<$crate::core::AttributeHeader> {
                self.store.read().layer_header(name).cloned()
            }

            fn attribute_at(&self, index: usize) -> Option<$crate::core::AttributeHeader> {
                self.store.read().layer_at(index).cloned()
            }
        }
    };
}

pub(crate) use impl_store_host;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ComponentVec;

    fn store() -> Store {
        let mut s = Store::new(&[(Domain::Point, "points")]);
        s.resize_domain(Domain::Point, 2);
        s.collection_mut("points")
            .unwrap()
            .add_values(
                "co",
                DataType::VEC3F,
                Access::ReadWrite,
                ComponentVec::Float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            )
            .unwrap();
        s.add_alias_layer(
            AttributeHeader::new("position", AttributeDataKind::FloatVector, Domain::Point),
            "points",
            "co",
        )
        .unwrap();
        s
    }

    #[test]
    fn test_alias_layer_shares_storage() {
        let mut s = store();
        let layer = CollectionLocator::attribute("position");
        assert_eq!(s.element_count(&layer).unwrap(), 2);
        assert_eq!(s.field_type(&layer, "vector").unwrap(), DataType::VEC3F);
        assert!(matches!(
            s.field_type(&layer, "co"),
            Err(Error::FieldNotFound { .. })
        ));

        s.write_field(&layer, "vector", Components::Float(&[0.0; 6]))
            .unwrap();
        let mut out = [9.0f32; 6];
        s.read_field(&"points".into(), "co", ComponentsMut::Float(&mut out))
            .unwrap();
        assert_eq!(out, [0.0; 6]);
    }

    #[test]
    fn test_owned_layer_follows_domain_size() {
        let mut s = store();
        s.add_layer(AttributeHeader::new("w", AttributeDataKind::Float, Domain::Point))
            .unwrap();
        let layer = CollectionLocator::attribute("w");
        assert_eq!(s.element_count(&layer).unwrap(), 2);
        s.resize_domain(Domain::Point, 5);
        assert_eq!(s.element_count(&layer).unwrap(), 5);
        assert_eq!(s.element_count(&"points".into()).unwrap(), 5);
    }

    #[test]
    fn test_lookup_failures() {
        let s = store();
        assert!(matches!(
            s.element_count(&"edges".into()),
            Err(Error::CollectionNotFound(_))
        ));
        assert!(matches!(
            s.element_count(&CollectionLocator::attribute("nope")),
            Err(Error::CollectionNotFound(_))
        ));
        assert!(matches!(
            s.field_type(&"points".into(), "nope"),
            Err(Error::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_layer() {
        let mut s = store();
        let h = AttributeHeader::new("position", AttributeDataKind::Float, Domain::Point);
        assert!(matches!(s.add_layer(h), Err(Error::InvalidArgument(_))));
    }
}
