//! Buffer proxies over host property collections.
//!
//! A [`BufferProxy`] wraps one (host, collection, field) triple and owns a
//! flat numeric buffer holding that field for every element of the
//! collection. [`BufferProxy::get`] pulls the field from the host in one
//! bulk transfer, [`BufferProxy::set`] pushes it back.
//!
//! ```ignore
//! use meshbuf::prelude::*;
//!
//! let mesh = MemoryMesh::cube()?;
//! let mut co = BufferProxy::new(&mesh, "vertices", "co");
//! co.get()?;
//! for v in co.iter_mut::<f32>()? {
//!     v[2] += 1.0;
//! }
//! co.set()?;
//! ```

mod array;
mod ops;

pub use array::{Array, Operand};
pub use ops::Numeric;

use tracing::{debug, trace};

use crate::core::{CollectionLocator, PropertyHost};
use crate::util::{Component, ComponentVec, Dimensions, Error, PlainOldDataType, Result};

/// Proxy between a host collection field and a flat numeric buffer.
///
/// The buffer holds `items * length` components in element order and is
/// shaped `(items,)` for scalar fields or `(items, length)` otherwise.
/// Views returned by indexing and iteration borrow the buffer directly.
pub struct BufferProxy<'h, H: PropertyHost + ?Sized> {
    host: &'h H,
    locator: CollectionLocator,
    field: String,
    buffer: Option<ComponentVec>,
    items: usize,
    length: usize,
    extended: bool,
}

impl<'h, H: PropertyHost + ?Sized> BufferProxy<'h, H> {
    /// Create an empty proxy. No host access happens until [`get`](Self::get).
    ///
    /// It is fine to create a proxy for an empty collection, but transfers
    /// fail for as long as it stays empty.
    pub fn new(host: &'h H, locator: impl Into<CollectionLocator>, field: impl Into<String>) -> Self {
        Self {
            host,
            locator: locator.into(),
            field: field.into(),
            buffer: None,
            items: 0,
            length: 0,
            extended: false,
        }
    }

    pub fn host(&self) -> &'h H {
        self.host
    }

    pub fn locator(&self) -> &CollectionLocator {
        &self.locator
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Number of elements in the buffer.
    pub fn items(&self) -> usize {
        self.items
    }

    /// Number of components per element.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn len(&self) -> usize {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// True after [`extend`](Self::extend) until the next [`get`](Self::get).
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    /// Component type of the buffer, None if no buffer is allocated.
    pub fn pod(&self) -> Option<PlainOldDataType> {
        self.buffer.as_ref().map(ComponentVec::pod)
    }

    /// Shape of the buffer.
    pub fn dims(&self) -> Dimensions {
        Dimensions::for_buffer(self.items, self.length)
    }

    /// The raw buffer.
    pub fn buffer(&self) -> Option<&ComponentVec> {
        self.buffer.as_ref()
    }

    fn empty_error(&self) -> Error {
        Error::EmptyCollection(format!("{}.{}", self.locator, self.field))
    }

    // ========================================================================
    // Host transfer
    // ========================================================================

    /// Transfer the field of every element into the buffer.
    ///
    /// The buffer is (re)allocated when there is none yet, when the number
    /// of elements, the component count or the component type changed, or
    /// after [`extend`](Self::extend). Otherwise the existing storage is
    /// overwritten in place.
    pub fn get(&mut self) -> Result<()> {
        let items = self.host.element_count(&self.locator)?;
        if items == 0 {
            self.buffer = None;
            self.items = 0;
            self.length = 0;
            self.extended = false;
            return Err(self.empty_error());
        }

        let data_type = self.host.field_type(&self.locator, &self.field)?;
        let storage = data_type.storage();
        let length = data_type.components().max(1);

        let stale = match &self.buffer {
            None => true,
            Some(buffer) => {
                items != self.items
                    || length != self.length
                    || self.extended
                    || buffer.pod() != storage
            }
        };
        if stale {
            let buffer = ComponentVec::zeroed(storage, items * length).ok_or_else(|| {
                Error::TypeMismatch {
                    expected: "boolean, integer or float field".to_string(),
                    actual: data_type.to_string(),
                }
            })?;
            debug!(
                "allocating buffer for {}.{}: {} x {} {}",
                self.locator, self.field, items, length, storage
            );
            self.buffer = Some(buffer);
            self.items = items;
            self.length = length;
        }
        self.extended = false;

        let buffer = self.buffer.as_mut().ok_or(Error::NoBuffer)?;
        self.host
            .read_field(&self.locator, &self.field, buffer.as_components_mut())?;
        trace!("get {}.{}: {} components", self.locator, self.field, buffer.len());
        Ok(())
    }

    /// Transfer the buffer back into the field of every element.
    ///
    /// Fails without writing anything if the collection is empty or the
    /// field's shape no longer matches the buffer.
    pub fn set(&self) -> Result<()> {
        let buffer = self.check_set()?;
        self.host
            .write_field(&self.locator, &self.field, buffer.as_components())?;
        trace!("set {}.{}: {} components", self.locator, self.field, buffer.len());
        Ok(())
    }

    /// Everything [`set`](Self::set) verifies before it writes.
    pub(crate) fn check_set(&self) -> Result<&ComponentVec> {
        let items = self.host.element_count(&self.locator)?;
        if items == 0 {
            return Err(self.empty_error());
        }

        let length = self.host.field_type(&self.locator, &self.field)?.components();
        if length != self.length {
            return Err(Error::ShapeMismatch(format!(
                "vector length {} does not match length {} of {}.{} (extended: {})",
                self.length, length, self.locator, self.field, self.extended
            )));
        }

        let buffer = self.buffer.as_ref().ok_or(Error::NoBuffer)?;
        if items != self.items {
            return Err(Error::ShapeMismatch(format!(
                "buffer holds {} elements but {} has {}",
                self.items, self.locator, items
            )));
        }
        Ok(buffer)
    }

    /// Drop the buffer and return it; the next [`get`](Self::get) allocates anew.
    pub fn release(&mut self) -> Option<ComponentVec> {
        self.buffer.take()
    }

    /// Copy the buffer into an owned array.
    pub fn snapshot<T: Component>(&self) -> Result<Array<T>> {
        Array::new(self.as_slice::<T>()?.to_vec(), self.items, self.length)
    }

    // ========================================================================
    // Container access
    // ========================================================================

    /// Flat view of the whole buffer.
    pub fn as_slice<T: Component>(&self) -> Result<&[T]> {
        self.buffer.as_ref().ok_or(Error::NoBuffer)?.as_slice::<T>()
    }

    /// Flat mutable view of the whole buffer.
    pub fn as_slice_mut<T: Component>(&mut self) -> Result<&mut [T]> {
        self.buffer.as_mut().ok_or(Error::NoBuffer)?.as_slice_mut::<T>()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items {
            return Err(Error::IndexOutOfRange {
                index,
                count: self.items,
            });
        }
        Ok(())
    }

    /// Components of one element.
    pub fn item<T: Component>(&self, index: usize) -> Result<&[T]> {
        self.check_index(index)?;
        let length = self.length;
        Ok(&self.as_slice::<T>()?[index * length..(index + 1) * length])
    }

    /// Mutable components of one element.
    pub fn item_mut<T: Component>(&mut self, index: usize) -> Result<&mut [T]> {
        self.check_index(index)?;
        let length = self.length;
        Ok(&mut self.as_slice_mut::<T>()?[index * length..(index + 1) * length])
    }

    /// Assign one element. A single value is broadcast to all components.
    pub fn set_item<T: Component>(&mut self, index: usize, value: &[T]) -> Result<()> {
        assign(self.item_mut::<T>(index)?, value)
    }

    /// Iterate over the elements in order.
    ///
    /// Each call starts a new pass over the buffer.
    pub fn iter<T: Component>(&self) -> Result<std::slice::ChunksExact<'_, T>> {
        let length = self.length.max(1);
        Ok(self.as_slice::<T>()?.chunks_exact(length))
    }

    /// Iterate mutably over the elements in order.
    pub fn iter_mut<T: Component>(&mut self) -> Result<std::slice::ChunksExactMut<'_, T>> {
        let length = self.length.max(1);
        Ok(self.as_slice_mut::<T>()?.chunks_exact_mut(length))
    }

    // ========================================================================
    // Homogeneous coordinates
    // ========================================================================

    fn check_vector_op(&self, required: usize, op: &str) -> Result<()> {
        if self.host.element_count(&self.locator)? == 0 {
            return Err(self.empty_error());
        }
        if self.buffer.is_none() {
            return Err(Error::NoBuffer);
        }
        if self.length != required {
            return Err(Error::ShapeMismatch(format!(
                "{op} needs {required}-component vectors, buffer has {}",
                self.length
            )));
        }
        Ok(())
    }

    /// Add a 4th component to every 3-component element.
    ///
    /// The new component is 1 (a point), or 0 when `normal` is set (a
    /// direction, unaffected by the translation part of a 4x4 matrix).
    /// The host is not touched; the next [`get`](Self::get) reallocates.
    pub fn extend(&mut self, normal: bool) -> Result<()> {
        self.check_vector_op(3, "extend")?;
        let Some(buffer) = self.buffer.take() else {
            return Err(Error::NoBuffer);
        };
        self.buffer = Some(match buffer {
            ComponentVec::Bool(v) => ComponentVec::Bool(widen(&v, normal)),
            ComponentVec::Int(v) => ComponentVec::Int(widen(&v, normal)),
            ComponentVec::Float(v) => ComponentVec::Float(widen(&v, normal)),
        });
        self.length = 4;
        self.extended = true;
        Ok(())
    }

    /// Drop the 4th component of every 4-component element.
    pub fn discard(&mut self) -> Result<()> {
        self.check_vector_op(4, "discard")?;
        let buffer = self.buffer.as_mut().ok_or(Error::NoBuffer)?;
        buffer.retain_leading(4, 3);
        self.length = 3;
        Ok(())
    }
}

fn widen<T: Component>(v: &[T], normal: bool) -> Vec<T> {
    let fill = if normal { T::ZERO } else { T::ONE };
    let mut out = Vec::with_capacity(v.len() / 3 * 4);
    for chunk in v.chunks_exact(3) {
        out.extend_from_slice(chunk);
        out.push(fill);
    }
    out
}

/// Assign `value` to `dst`, broadcasting a single value.
pub(crate) fn assign<T: Copy>(dst: &mut [T], value: &[T]) -> Result<()> {
    match value.len() {
        n if n == dst.len() => dst.copy_from_slice(value),
        1 => dst.fill(value[0]),
        n => {
            return Err(Error::ShapeMismatch(format!(
                "cannot assign {n} components to {}",
                dst.len()
            )))
        }
    }
    Ok(())
}

impl<H: PropertyHost + ?Sized> std::fmt::Debug for BufferProxy<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferProxy")
            .field("locator", &self.locator)
            .field("field", &self.field)
            .field("dims", &self.dims())
            .field("pod", &self.pod())
            .field("extended", &self.extended)
            .finish()
    }
}
