//! Plain Old Data types - the component types a field or buffer can hold.

use bytemuck::{Pod, Zeroable};
use std::fmt;

use super::{Error, Result};

/// Plain Old Data type enum - the scalar type of one field component.
///
/// Hosts report the native type of a field; buffers only ever store
/// [`Boolean`](Self::Boolean), [`Int32`](Self::Int32) or
/// [`Float32`](Self::Float32) (see [`DataType::storage`](super::DataType::storage)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PlainOldDataType {
    /// Boolean (stored as u8: 0 = false, non-zero = true)
    Boolean = 0,
    /// Unsigned 8-bit integer
    Uint8 = 1,
    /// Signed 8-bit integer
    Int8 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Signed 32-bit integer
    Int32 = 4,
    /// Signed 64-bit integer
    Int64 = 5,
    /// 32-bit floating point
    Float32 = 6,
    /// 64-bit floating point
    Float64 = 7,
    /// UTF-8 string
    String = 8,
    /// Unknown/invalid type
    #[default]
    Unknown = 127,
}

impl PlainOldDataType {
    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "bool_t",
            Self::Uint8 => "uint8_t",
            Self::Int8 => "int8_t",
            Self::Int16 => "int16_t",
            Self::Int32 => "int32_t",
            Self::Int64 => "int64_t",
            Self::Float32 => "float32_t",
            Self::Float64 => "float64_t",
            Self::String => "string",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true if this is an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8 | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for PlainOldDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Boolean type with guaranteed 1-byte storage.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Bool(u8);

impl Bool {
    pub const TRUE: Self = Self(1);
    pub const FALSE: Self = Self(0);

    #[inline]
    pub const fn new(v: bool) -> Self {
        Self(v as u8)
    }

    #[inline]
    pub const fn get(self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for Bool {
    #[inline]
    fn from(v: bool) -> Self {
        Self::new(v)
    }
}

impl From<Bool> for bool {
    #[inline]
    fn from(v: Bool) -> Self {
        v.get()
    }
}

impl PartialEq<bool> for Bool {
    fn eq(&self, other: &bool) -> bool {
        self.get() == *other
    }
}

impl fmt::Debug for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl fmt::Display for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

// === Component storage ===

/// Owned, flat component storage in one of the three buffer types.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentVec {
    Bool(Vec<Bool>),
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl ComponentVec {
    /// Allocate zeroed storage for `len` components of a storage type.
    ///
    /// Returns None for types a buffer cannot hold (strings, unknown).
    pub fn zeroed(pod: PlainOldDataType, len: usize) -> Option<Self> {
        match pod {
            PlainOldDataType::Boolean => Some(Self::Bool(vec![Bool::FALSE; len])),
            PlainOldDataType::Int32 => Some(Self::Int(vec![0; len])),
            PlainOldDataType::Float32 => Some(Self::Float(vec![0.0; len])),
            _ => None,
        }
    }

    /// The storage type of these components.
    pub fn pod(&self) -> PlainOldDataType {
        match self {
            Self::Bool(_) => PlainOldDataType::Boolean,
            Self::Int(_) => PlainOldDataType::Int32,
            Self::Float(_) => PlainOldDataType::Float32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow as a transfer source.
    pub fn as_components(&self) -> Components<'_> {
        match self {
            Self::Bool(v) => Components::Bool(v),
            Self::Int(v) => Components::Int(v),
            Self::Float(v) => Components::Float(v),
        }
    }

    /// Borrow as a transfer destination.
    pub fn as_components_mut(&mut self) -> ComponentsMut<'_> {
        match self {
            Self::Bool(v) => ComponentsMut::Bool(v),
            Self::Int(v) => ComponentsMut::Int(v),
            Self::Float(v) => ComponentsMut::Float(v),
        }
    }

    /// Typed view of the components.
    pub fn as_slice<T: Component>(&self) -> Result<&[T]> {
        let pod = self.pod();
        T::slice(self).ok_or_else(|| Error::type_mismatch(T::POD_TYPE, pod))
    }

    /// Typed mutable view of the components.
    pub fn as_slice_mut<T: Component>(&mut self) -> Result<&mut [T]> {
        let pod = self.pod();
        T::slice_mut(self).ok_or_else(|| Error::type_mismatch(T::POD_TYPE, pod))
    }

    /// Rebuild the storage keeping `keep` of every `stride` components.
    pub(crate) fn retain_leading(&mut self, stride: usize, keep: usize) {
        fn squeeze<T: Copy>(v: &mut Vec<T>, stride: usize, keep: usize) {
            let mut write = 0;
            for read in 0..v.len() {
                if read % stride < keep {
                    v[write] = v[read];
                    write += 1;
                }
            }
            v.truncate(write);
        }
        match self {
            Self::Bool(v) => squeeze(v, stride, keep),
            Self::Int(v) => squeeze(v, stride, keep),
            Self::Float(v) => squeeze(v, stride, keep),
        }
    }
}

/// Borrowed flat components used as a bulk transfer source.
#[derive(Clone, Copy, Debug)]
pub enum Components<'a> {
    Bool(&'a [Bool]),
    Int(&'a [i32]),
    Float(&'a [f32]),
}

impl Components<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pod(&self) -> PlainOldDataType {
        match self {
            Self::Bool(_) => PlainOldDataType::Boolean,
            Self::Int(_) => PlainOldDataType::Int32,
            Self::Float(_) => PlainOldDataType::Float32,
        }
    }

    /// Copy into `dst`, converting between component types.
    ///
    /// Booleans convert to 0/1, floats convert to integers by truncation and
    /// any non-zero value converts to `true`. Lengths must match exactly.
    pub fn copy_into(self, dst: ComponentsMut<'_>) -> Result<()> {
        if self.len() != dst.len() {
            return Err(Error::ShapeMismatch(format!(
                "transfer of {} components into a buffer of {}",
                self.len(),
                dst.len()
            )));
        }
        match (self, dst) {
            (Self::Bool(s), ComponentsMut::Bool(d)) => d.copy_from_slice(s),
            (Self::Int(s), ComponentsMut::Int(d)) => d.copy_from_slice(s),
            (Self::Float(s), ComponentsMut::Float(d)) => d.copy_from_slice(s),
            (Self::Bool(s), ComponentsMut::Int(d)) => convert(s, d, |b| b.get() as i32),
            (Self::Bool(s), ComponentsMut::Float(d)) => convert(s, d, |b| b.get() as u8 as f32),
            (Self::Int(s), ComponentsMut::Bool(d)) => convert(s, d, |i| Bool::new(i != 0)),
            (Self::Int(s), ComponentsMut::Float(d)) => convert(s, d, |i| i as f32),
            (Self::Float(s), ComponentsMut::Bool(d)) => convert(s, d, |f| Bool::new(f != 0.0)),
            (Self::Float(s), ComponentsMut::Int(d)) => convert(s, d, |f| f as i32),
        }
        Ok(())
    }
}

#[inline]
fn convert<S: Copy, D>(src: &[S], dst: &mut [D], f: impl Fn(S) -> D) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f(s);
    }
}

/// Borrowed flat components used as a bulk transfer destination.
#[derive(Debug)]
pub enum ComponentsMut<'a> {
    Bool(&'a mut [Bool]),
    Int(&'a mut [i32]),
    Float(&'a mut [f32]),
}

impl ComponentsMut<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pod(&self) -> PlainOldDataType {
        match self {
            Self::Bool(_) => PlainOldDataType::Boolean,
            Self::Int(_) => PlainOldDataType::Int32,
            Self::Float(_) => PlainOldDataType::Float32,
        }
    }
}

// === Component trait for typed access ===

/// Trait for the types a buffer can be viewed as.
pub trait Component: Pod + Zeroable + Copy + Default + PartialEq + fmt::Debug + 'static {
    /// The corresponding storage type.
    const POD_TYPE: PlainOldDataType;
    /// Value used for the 4th component of an extended direction.
    const ZERO: Self;
    /// Value used for the 4th component of an extended point.
    const ONE: Self;

    fn slice(values: &ComponentVec) -> Option<&[Self]>;
    fn slice_mut(values: &mut ComponentVec) -> Option<&mut [Self]>;
    fn wrap(values: Vec<Self>) -> ComponentVec;
    fn borrowed(values: &[Self]) -> Components<'_>;
}

macro_rules! impl_component {
    ($ty:ty, $variant:ident, $pod:ident, $zero:expr, $one:expr) => {
        impl Component for $ty {
            const POD_TYPE: PlainOldDataType = PlainOldDataType::$pod;
            const ZERO: Self = $zero;
            const ONE: Self = $one;

            #[inline]
            fn slice(values: &ComponentVec) -> Option<&[Self]> {
                match values {
                    ComponentVec::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn slice_mut(values: &mut ComponentVec) -> Option<&mut [Self]> {
                match values {
                    ComponentVec::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn wrap(values: Vec<Self>) -> ComponentVec {
                ComponentVec::$variant(values)
            }

            #[inline]
            fn borrowed(values: &[Self]) -> Components<'_> {
                Components::$variant(values)
            }
        }
    };
}

impl_component!(Bool, Bool, Boolean, Bool::FALSE, Bool::TRUE);
impl_component!(i32, Int, Int32, 0, 1);
impl_component!(f32, Float, Float32, 0.0, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_names() {
        assert_eq!(PlainOldDataType::Boolean.name(), "bool_t");
        assert_eq!(PlainOldDataType::Float32.to_string(), "float32_t");
        assert!(PlainOldDataType::Int16.is_integer());
        assert!(PlainOldDataType::Float64.is_float());
        assert!(!PlainOldDataType::String.is_integer());
    }

    #[test]
    fn test_bool_type() {
        assert!(Bool::new(true).get());
        assert!(!Bool::new(false).get());
        assert_eq!(Bool::TRUE, true);
        assert_eq!(std::mem::size_of::<Bool>(), 1);
    }

    #[test]
    fn test_zeroed_storage() {
        let v = ComponentVec::zeroed(PlainOldDataType::Float32, 6).unwrap();
        assert_eq!(v.len(), 6);
        assert_eq!(v.pod(), PlainOldDataType::Float32);
        assert!(ComponentVec::zeroed(PlainOldDataType::String, 3).is_none());
    }

    #[test]
    fn test_typed_views() {
        let mut v = ComponentVec::Int(vec![1, 2, 3]);
        assert_eq!(v.as_slice::<i32>().unwrap(), &[1, 2, 3]);
        v.as_slice_mut::<i32>().unwrap()[1] = 7;
        assert_eq!(v.as_slice::<i32>().unwrap(), &[1, 7, 3]);
        assert!(matches!(v.as_slice::<f32>(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_converting_copy() {
        let src = [Bool::TRUE, Bool::FALSE, Bool::TRUE];
        let mut dst = [0.5f32; 3];
        Components::Bool(&src)
            .copy_into(ComponentsMut::Float(&mut dst))
            .unwrap();
        assert_eq!(dst, [1.0, 0.0, 1.0]);

        let floats = [2.9f32, -1.5];
        let mut ints = [0i32; 2];
        Components::Float(&floats)
            .copy_into(ComponentsMut::Int(&mut ints))
            .unwrap();
        assert_eq!(ints, [2, -1]);

        let mut short = [0i32; 1];
        assert!(Components::Float(&floats)
            .copy_into(ComponentsMut::Int(&mut short))
            .is_err());
    }

    #[test]
    fn test_retain_leading() {
        let mut v = ComponentVec::Float(vec![1.0, 2.0, 3.0, 9.0, 4.0, 5.0, 6.0, 9.0]);
        v.retain_leading(4, 3);
        assert_eq!(v.as_slice::<f32>().unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
