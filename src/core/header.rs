//! Headers for attribute layers.
//!
//! A header is the host-independent description of one layer in an
//! attribute registry. It also serves as a direct layer reference when
//! building a [`UnifiedAttributeProxy`](crate::unified::UnifiedAttributeProxy).

use super::{AttributeDataKind, Domain, StorageKind};

/// Header information for an attribute layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeHeader {
    /// Name of the layer (e.g. "UVMap", "position").
    pub name: String,
    /// Value type of the layer.
    pub data_kind: AttributeDataKind,
    /// Storage kind, None for hosts that do not expose the concept.
    pub storage: Option<StorageKind>,
    /// Element kind the layer is attached to.
    pub domain: Domain,
}

impl AttributeHeader {
    /// Create a header for a plain per-element layer.
    pub fn new(name: impl Into<String>, data_kind: AttributeDataKind, domain: Domain) -> Self {
        Self {
            name: name.into(),
            data_kind,
            storage: None,
            domain,
        }
    }

    /// Set the storage kind.
    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Storage kind, defaulting to a plain array.
    pub fn storage_kind(&self) -> StorageKind {
        self.storage.unwrap_or_default()
    }

    /// Field holding the layer's values when none is named explicitly.
    pub fn default_field(&self) -> &'static str {
        self.data_kind.default_field()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_default() {
        let h = AttributeHeader::new("Col", AttributeDataKind::ByteColor, Domain::Corner);
        assert_eq!(h.storage, None);
        assert_eq!(h.storage_kind(), StorageKind::Array);
        assert_eq!(h.default_field(), "color");

        let h = h.with_storage(StorageKind::Single);
        assert_eq!(h.storage_kind(), StorageKind::Single);
    }
}
