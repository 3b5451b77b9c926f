//! DataType - combines POD type with extent (component count).

use super::PlainOldDataType;
use std::fmt;

/// DataType describes how one element's field is stored.
///
/// It combines a [`PlainOldDataType`] with an extent (component count).
/// For example, a vertex coordinate would be Float32 with extent 3.
/// This is the resolved schema of a field: hosts report it, and a
/// buffer proxy derives its shape and storage type from it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// The base plain old data type
    pub pod: PlainOldDataType,
    /// Number of POD components (1 for scalar, 2 for Vec2, 3 for Vec3, etc.)
    pub extent: u8,
}

impl DataType {
    /// Create a new DataType with given POD and extent.
    #[inline]
    pub const fn new(pod: PlainOldDataType, extent: u8) -> Self {
        Self { pod, extent }
    }

    /// Create a scalar DataType (extent = 1).
    #[inline]
    pub const fn scalar(pod: PlainOldDataType) -> Self {
        Self { pod, extent: 1 }
    }

    /// Number of components per element.
    #[inline]
    pub const fn components(&self) -> usize {
        self.extent as usize
    }

    /// The component type a buffer uses to hold this field.
    ///
    /// Booleans and integers keep their kind, everything numeric else
    /// is stored as 32-bit float. Strings and unknown types map to
    /// [`PlainOldDataType::Unknown`]; no buffer can hold them.
    pub const fn storage(&self) -> PlainOldDataType {
        match self.pod {
            PlainOldDataType::Boolean => PlainOldDataType::Boolean,
            p if p.is_integer() => PlainOldDataType::Int32,
            p if p.is_float() => PlainOldDataType::Float32,
            _ => PlainOldDataType::Unknown,
        }
    }

    /// Unknown/invalid DataType.
    pub const UNKNOWN: Self = Self::new(PlainOldDataType::Unknown, 0);

    // Scalars
    pub const BOOL: Self = Self::scalar(PlainOldDataType::Boolean);
    pub const INT8: Self = Self::scalar(PlainOldDataType::Int8);
    pub const INT32: Self = Self::scalar(PlainOldDataType::Int32);
    pub const FLOAT32: Self = Self::scalar(PlainOldDataType::Float32);
    pub const STRING: Self = Self::scalar(PlainOldDataType::String);

    // Vectors
    pub const VEC2F: Self = Self::new(PlainOldDataType::Float32, 2);
    pub const VEC3F: Self = Self::new(PlainOldDataType::Float32, 3);
    pub const VEC2I: Self = Self::new(PlainOldDataType::Int32, 2);
    pub const VEC2S: Self = Self::new(PlainOldDataType::Int16, 2);

    // Quaternion (w, x, y, z) and RGBA color
    pub const QUATF: Self = Self::new(PlainOldDataType::Float32, 4);
    pub const COLOR4F: Self = Self::new(PlainOldDataType::Float32, 4);

    // Matrix stored as extent = rows * cols
    pub const MAT44F: Self = Self::new(PlainOldDataType::Float32, 16);
}

impl Default for DataType {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extent == 1 {
            write!(f, "{}", self.pod.name())
        } else {
            write!(f, "{}[{}]", self.pod.name(), self.extent)
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_display() {
        assert_eq!(format!("{}", DataType::FLOAT32), "float32_t");
        assert_eq!(format!("{}", DataType::VEC3F), "float32_t[3]");
        assert_eq!(DataType::MAT44F.components(), 16);
    }

    #[test]
    fn test_storage_promotion() {
        assert_eq!(DataType::BOOL.storage(), PlainOldDataType::Boolean);
        assert_eq!(DataType::INT8.storage(), PlainOldDataType::Int32);
        assert_eq!(DataType::VEC2S.storage(), PlainOldDataType::Int32);
        assert_eq!(
            DataType::new(PlainOldDataType::Float64, 3).storage(),
            PlainOldDataType::Float32
        );
        assert_eq!(DataType::STRING.storage(), PlainOldDataType::Unknown);
    }
}
