//! Abstract traits for host objects.
//!
//! These traits are the whole interface between the proxies and the
//! application that owns the data. A host exposes element collections
//! with bulk field transfer, and optionally an attribute layer registry.

use crate::core::{AttributeHeader, CollectionLocator};
use crate::util::{Components, ComponentsMut, DataType, Result};

/// Collection holding one entry per face.
pub const FACES_COLLECTION: &str = "polygons";
/// Face field holding the index of the face's first loop.
pub const LOOP_START_FIELD: &str = "loop_start";
/// Face field holding the number of loops of the face.
pub const LOOP_TOTAL_FIELD: &str = "loop_total";

// ============================================================================
// Property Traits
// ============================================================================

/// Element collections with bulk field transfer.
///
/// All methods take `&self`: a host that allows writes uses interior
/// mutability, so proxies can share one host reference.
pub trait PropertyHost {
    /// Number of live elements in a collection.
    fn element_count(&self, locator: &CollectionLocator) -> Result<usize>;

    /// Schema of a field of the collection's element type.
    ///
    /// Fails with `FieldNotFound` if the element type has no such field.
    fn field_type(&self, locator: &CollectionLocator, field: &str) -> Result<DataType>;

    /// Copy the field of every element into `dst`, in element order.
    ///
    /// `dst` holds `element_count * extent` components and may have a
    /// different component type than the field; the host converts.
    fn read_field(
        &self,
        locator: &CollectionLocator,
        field: &str,
        dst: ComponentsMut<'_>,
    ) -> Result<()>;

    /// Copy `src` into the field of every element, in element order.
    ///
    /// Hosts may silently ignore writes to read-only fields or coerce the
    /// written values to the field's native precision.
    fn write_field(&self, locator: &CollectionLocator, field: &str, src: Components<'_>)
        -> Result<()>;

    /// Check if the collection's element type has a field.
    fn has_field(&self, locator: &CollectionLocator, field: &str) -> bool {
        self.field_type(locator, field).is_ok()
    }
}

// ============================================================================
// Attribute Traits
// ============================================================================

/// Hosts with a registry of named, typed attribute layers.
pub trait AttributeHost: PropertyHost {
    /// Number of layers in the registry.
    fn num_attributes(&self) -> usize;

    /// Look up a layer by name.
    fn attribute_by_name(&self, name: &str) -> Option<AttributeHeader>;

    /// Look up a layer by position.
    fn attribute_at(&self, index: usize) -> Option<AttributeHeader>;

    /// Names of all layers in registry order.
    fn attribute_names(&self) -> Vec<String> {
        (0..self.num_attributes())
            .filter_map(|i| self.attribute_at(i))
            .map(|h| h.name)
            .collect()
    }

    /// Locator of the elements of a layer.
    fn attribute_locator(&self, header: &AttributeHeader) -> CollectionLocator {
        CollectionLocator::attribute(header.name.as_str())
    }

    /// Locator of the face collection holding the loop table.
    fn faces_locator(&self) -> CollectionLocator {
        CollectionLocator::named(FACES_COLLECTION)
    }
}
