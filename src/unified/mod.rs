//! Unified attribute layer proxies.
//!
//! [`UnifiedAttributeProxy`] resolves a layer of a host's attribute
//! registry and hides where its values live. Face, edge and point layers
//! hold one value per element and are backed by a single
//! [`BufferProxy`]. Face-corner (loop) layers are stored as one flat
//! buffer shared by all faces; each face names a start offset and a
//! count into it. For those the proxy also keeps the face loop table and
//! indexes by face, handing out the variable-length window of loops that
//! belong to it.
//!
//! ```ignore
//! use meshbuf::prelude::*;
//!
//! let mesh = MemoryMesh::cube()?;
//! mesh.add_vertex_colors("Col")?;
//! let mut colors = UnifiedAttributeProxy::new(&mesh, "Col", None)?;
//! for (face, loops) in colors.iter_mut::<f32>()?.enumerate() {
//!     let grey = face as f32 / 6.0;
//!     for rgba in loops.chunks_exact_mut(4) {
//!         rgba.copy_from_slice(&[grey, grey, grey, 1.0]);
//!     }
//! }
//! colors.set()?;
//! ```

mod windows;

pub use windows::{Windows, WindowsMut};

use std::ops::Range;

use tracing::debug;

use crate::buffer::{assign, Array, BufferProxy, Numeric, Operand};
use crate::core::{
    AttributeDataKind, AttributeHeader, AttributeHost, Domain, StorageKind, LOOP_START_FIELD,
    LOOP_TOTAL_FIELD,
};
use crate::util::{Component, Error, Matrix, Result};

/// How to find an attribute layer.
#[derive(Clone, Debug)]
pub enum AttributeSelector<'a> {
    /// Look up by layer name.
    Name(&'a str),
    /// Look up by position in the registry.
    Index(usize),
    /// Use a layer reference directly.
    Layer(AttributeHeader),
}

impl<'a> From<&'a str> for AttributeSelector<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for AttributeSelector<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl From<usize> for AttributeSelector<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<AttributeHeader> for AttributeSelector<'_> {
    fn from(header: AttributeHeader) -> Self {
        Self::Layer(header)
    }
}

impl From<&AttributeHeader> for AttributeSelector<'_> {
    fn from(header: &AttributeHeader) -> Self {
        Self::Layer(header.clone())
    }
}

/// Face loop table: first loop and loop count per face.
struct LoopTable<'h, H: AttributeHost + ?Sized> {
    start: BufferProxy<'h, H>,
    total: BufferProxy<'h, H>,
}

/// Proxy for one unified attribute layer.
pub struct UnifiedAttributeProxy<'h, H: AttributeHost + ?Sized> {
    header: AttributeHeader,
    field: String,
    loops: Option<LoopTable<'h, H>>,
    values: BufferProxy<'h, H>,
}

impl<'h, H: AttributeHost + ?Sized> UnifiedAttributeProxy<'h, H> {
    /// Resolve a layer and fetch its data.
    ///
    /// When `field` is None the field is chosen by data kind: "color" for
    /// color layers, "vector" for vector, quaternion and 2D layers,
    /// "value" otherwise. A field may not be given together with a
    /// direct layer reference.
    ///
    /// Only face-corner, face, edge and point layers with plain array
    /// storage are supported.
    pub fn new<'s>(
        host: &'h H,
        selector: impl Into<AttributeSelector<'s>>,
        field: Option<&str>,
    ) -> Result<Self> {
        let header = match selector.into() {
            AttributeSelector::Name(name) => host
                .attribute_by_name(name)
                .ok_or_else(|| Error::unknown_attribute_name(name))?,
            AttributeSelector::Index(index) => host
                .attribute_at(index)
                .ok_or_else(|| Error::unknown_attribute_index(index, host.num_attributes()))?,
            AttributeSelector::Layer(header) => {
                if field.is_some() {
                    return Err(Error::InvalidArgument(
                        "field must be None when selecting by layer reference".to_string(),
                    ));
                }
                header
            }
        };

        let field = field.unwrap_or(header.default_field()).to_string();
        let locator = host.attribute_locator(&header);
        if !host.has_field(&locator, &field) {
            return Err(Error::missing_field(&header.name, &field));
        }

        if !header.domain.is_supported() {
            return Err(Error::DomainNotSupported(header.domain.to_string()));
        }
        if header.storage_kind() != StorageKind::Array {
            return Err(Error::StorageNotSupported(header.storage_kind().to_string()));
        }

        let loops = match header.domain {
            Domain::Corner => {
                let faces = host.faces_locator();
                Some(LoopTable {
                    start: BufferProxy::new(host, faces.clone(), LOOP_START_FIELD),
                    total: BufferProxy::new(host, faces, LOOP_TOTAL_FIELD),
                })
            }
            _ => None,
        };

        debug!(
            "attribute proxy {} ({} {}) field {}",
            header.name, header.domain, header.data_kind, field
        );

        let mut proxy = Self {
            values: BufferProxy::new(host, locator, field.as_str()),
            header,
            field,
            loops,
        };
        proxy.get()?;
        Ok(proxy)
    }

    pub fn header(&self) -> &AttributeHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn data_kind(&self) -> AttributeDataKind {
        self.header.data_kind
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.header.storage_kind()
    }

    pub fn domain(&self) -> Domain {
        self.header.domain
    }

    /// The resolved field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// True for face-corner layers, which are indexed by face.
    pub fn is_corner(&self) -> bool {
        self.loops.is_some()
    }

    /// The buffer holding the layer's values.
    pub fn values(&self) -> &BufferProxy<'h, H> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut BufferProxy<'h, H> {
        &mut self.values
    }

    /// First loop of every face (face-corner layers only).
    pub fn loop_start(&self) -> Option<&BufferProxy<'h, H>> {
        self.loops.as_ref().map(|l| &l.start)
    }

    /// Loop count of every face (face-corner layers only).
    pub fn loop_total(&self) -> Option<&BufferProxy<'h, H>> {
        self.loops.as_ref().map(|l| &l.total)
    }

    // ========================================================================
    // Host transfer
    // ========================================================================

    /// Re-fetch the loop table (if any) and the layer values.
    pub fn get(&mut self) -> Result<()> {
        if let Some(loops) = &mut self.loops {
            loops.start.get()?;
            loops.total.get()?;
            if loops.start.items() != loops.total.items() {
                return Err(Error::ShapeMismatch(format!(
                    "loop table has {} starts but {} totals",
                    loops.start.items(),
                    loops.total.items()
                )));
            }
        }
        self.values.get()
    }

    /// Write the loop table (if any) and the layer values back.
    ///
    /// Every buffer is checked against the host before the first one is
    /// written, so a failing `set` leaves the host untouched.
    pub fn set(&self) -> Result<()> {
        self.values.check_set()?;
        if let Some(loops) = &self.loops {
            loops.start.check_set()?;
            loops.total.check_set()?;
            loops.start.set()?;
            loops.total.set()?;
        }
        self.values.set()
    }

    // ========================================================================
    // Container access
    // ========================================================================

    /// Number of faces (face-corner layers) or elements.
    pub fn len(&self) -> usize {
        match &self.loops {
            Some(loops) => loops.start.items(),
            None => self.values.items(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Range of value rows belonging to face (or element) `index`.
    pub fn rows(&self, index: usize) -> Result<Range<usize>> {
        let count = self.len();
        if index >= count {
            return Err(Error::IndexOutOfRange { index, count });
        }
        let Some(loops) = &self.loops else {
            return Ok(index..index + 1);
        };

        let start = loops.start.as_slice::<i32>()?[index];
        let total = loops.total.as_slice::<i32>()?[index];
        let items = self.values.items();
        let (Ok(start), Ok(total)) = (usize::try_from(start), usize::try_from(total)) else {
            return Err(Error::ShapeMismatch(format!(
                "face {index} has negative loop start {start} or count {total}"
            )));
        };
        if start + total > items {
            return Err(Error::IndexOutOfRange {
                index: start + total,
                count: items,
            });
        }
        Ok(start..start + total)
    }

    fn components(&self, index: usize) -> Result<Range<usize>> {
        let rows = self.rows(index)?;
        let length = self.values.length();
        Ok(rows.start * length..rows.end * length)
    }

    fn all_components(&self) -> Result<Vec<Range<usize>>> {
        (0..self.len()).map(|i| self.components(i)).collect()
    }

    /// Values of face `index` (all of its loops) or element `index`.
    pub fn item<T: Component>(&self, index: usize) -> Result<&[T]> {
        let range = self.components(index)?;
        Ok(&self.values.as_slice::<T>()?[range])
    }

    /// Mutable values of face `index` or element `index`.
    pub fn item_mut<T: Component>(&mut self, index: usize) -> Result<&mut [T]> {
        let range = self.components(index)?;
        Ok(&mut self.values.as_slice_mut::<T>()?[range])
    }

    /// Assign face `index` or element `index`.
    ///
    /// `value` may hold one component (broadcast to everything), one
    /// element's components (broadcast to every loop of the face), or
    /// the complete window.
    pub fn set_item<T: Component>(&mut self, index: usize, value: &[T]) -> Result<()> {
        let length = self.values.length();
        let window = self.item_mut::<T>(index)?;
        if value.len() == length && window.len() != length {
            for row in window.chunks_exact_mut(length) {
                row.copy_from_slice(value);
            }
            return Ok(());
        }
        assign(window, value)
    }

    /// Iterate over faces (face-corner layers) or elements.
    pub fn iter<T: Component>(&self) -> Result<Windows<'_, T>> {
        let ranges = self.all_components()?;
        Ok(Windows::new(self.values.as_slice::<T>()?, ranges))
    }

    /// Iterate mutably over faces (face-corner layers) or elements.
    ///
    /// The loop table must list faces in storage order, as hosts do.
    pub fn iter_mut<T: Component>(&mut self) -> Result<WindowsMut<'_, T>> {
        let ranges = self.all_components()?;
        if !windows::is_ordered(&ranges) {
            return Err(Error::ShapeMismatch(
                "face loops overlap or are not in storage order".to_string(),
            ));
        }
        Ok(WindowsMut::new(self.values.as_slice_mut::<T>()?, ranges))
    }

    // ========================================================================
    // Vector operations, forwarded to the value buffer
    // ========================================================================

    /// See [`BufferProxy::extend`].
    pub fn extend(&mut self, normal: bool) -> Result<()> {
        self.values.extend(normal)
    }

    /// See [`BufferProxy::discard`].
    pub fn discard(&mut self) -> Result<()> {
        self.values.discard()
    }

    pub fn matmul(&self, matrix: impl Into<Matrix>) -> Result<Array<f32>> {
        self.values.matmul(matrix)
    }

    /// Transform in place; returns this proxy, not the value buffer.
    pub fn matmul_assign(&mut self, matrix: impl Into<Matrix>) -> Result<&mut Self> {
        self.values.matmul_assign(matrix)?;
        Ok(self)
    }

    pub fn add<'a, T: Numeric>(&self, rhs: impl Into<Operand<'a, T>>) -> Result<Array<T>> {
        self.values.add(rhs)
    }

    pub fn add_assign<'a, T: Numeric>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<&mut Self> {
        self.values.add_assign(rhs)?;
        Ok(self)
    }

    pub fn sub<'a, T: Numeric>(&self, rhs: impl Into<Operand<'a, T>>) -> Result<Array<T>> {
        self.values.sub(rhs)
    }

    pub fn sub_assign<'a, T: Numeric>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<&mut Self> {
        self.values.sub_assign(rhs)?;
        Ok(self)
    }

    pub fn mul<'a, T: Numeric>(&self, rhs: impl Into<Operand<'a, T>>) -> Result<Array<T>> {
        self.values.mul(rhs)
    }

    pub fn mul_assign<'a, T: Numeric>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<&mut Self> {
        self.values.mul_assign(rhs)?;
        Ok(self)
    }

    pub fn div<'a>(&self, rhs: impl Into<Operand<'a, f32>>) -> Result<Array<f32>> {
        self.values.div(rhs)
    }

    pub fn div_assign<'a>(&mut self, rhs: impl Into<Operand<'a, f32>>) -> Result<&mut Self> {
        self.values.div_assign(rhs)?;
        Ok(self)
    }
}

impl<H: AttributeHost + ?Sized> std::fmt::Debug for UnifiedAttributeProxy<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiedAttributeProxy")
            .field("header", &self.header)
            .field("field", &self.field)
            .field("len", &self.len())
            .field("values", &self.values)
            .finish()
    }
}
