//! Attribute layer classification: domain, storage kind and data kind.

use std::fmt;

use crate::util::DataType;

/// Element kind an attribute layer is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Per-vertex / per-point.
    #[default]
    Point,
    /// Per-edge.
    Edge,
    /// Per-face.
    Face,
    /// Per-face-corner (loop), addressed through the face loop table.
    Corner,
    /// Per-curve.
    Curve,
    /// Per-instance.
    Instance,
    /// Per-layer (grease pencil).
    Layer,
}

impl Domain {
    /// Parse from the host's identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "POINT" => Some(Self::Point),
            "EDGE" => Some(Self::Edge),
            "FACE" => Some(Self::Face),
            "CORNER" => Some(Self::Corner),
            "CURVE" => Some(Self::Curve),
            "INSTANCE" => Some(Self::Instance),
            "LAYER" => Some(Self::Layer),
            _ => None,
        }
    }

    /// The host's identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::Edge => "EDGE",
            Self::Face => "FACE",
            Self::Corner => "CORNER",
            Self::Curve => "CURVE",
            Self::Instance => "INSTANCE",
            Self::Layer => "LAYER",
        }
    }

    /// Whether a unified attribute proxy can be built for this domain.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Point | Self::Edge | Self::Face | Self::Corner)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How the host stores the values of a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// One value per element.
    #[default]
    Array,
    /// A single value shared by all elements.
    Single,
}

impl StorageKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ARRAY" => Some(Self::Array),
            "SINGLE" => Some(Self::Single),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array => "ARRAY",
            Self::Single => "SINGLE",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Value type of an attribute layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeDataKind {
    Float,
    Int,
    Boolean,
    FloatVector,
    FloatColor,
    ByteColor,
    Quaternion,
    Float4x4,
    String,
    Int8,
    Int16x2,
    Int32x2,
    Float2,
}

impl AttributeDataKind {
    pub const ALL: [Self; 13] = [
        Self::Float,
        Self::Int,
        Self::Boolean,
        Self::FloatVector,
        Self::FloatColor,
        Self::ByteColor,
        Self::Quaternion,
        Self::Float4x4,
        Self::String,
        Self::Int8,
        Self::Int16x2,
        Self::Int32x2,
        Self::Float2,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float => "FLOAT",
            Self::Int => "INT",
            Self::Boolean => "BOOLEAN",
            Self::FloatVector => "FLOAT_VECTOR",
            Self::FloatColor => "FLOAT_COLOR",
            Self::ByteColor => "BYTE_COLOR",
            Self::Quaternion => "QUATERNION",
            Self::Float4x4 => "FLOAT4X4",
            Self::String => "STRING",
            Self::Int8 => "INT8",
            Self::Int16x2 => "INT16_2D",
            Self::Int32x2 => "INT32_2D",
            Self::Float2 => "FLOAT2",
        }
    }

    /// Field that holds the value when no field name is given.
    pub fn default_field(&self) -> &'static str {
        match self {
            Self::FloatColor | Self::ByteColor => "color",
            Self::FloatVector | Self::Quaternion | Self::Int16x2 | Self::Int32x2 | Self::Float2 => {
                "vector"
            }
            _ => "value",
        }
    }

    /// Schema of the default field.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Float => DataType::FLOAT32,
            Self::Int => DataType::INT32,
            Self::Boolean => DataType::BOOL,
            Self::FloatVector => DataType::VEC3F,
            Self::FloatColor | Self::ByteColor => DataType::COLOR4F,
            Self::Quaternion => DataType::QUATF,
            Self::Float4x4 => DataType::MAT44F,
            Self::String => DataType::STRING,
            Self::Int8 => DataType::INT8,
            Self::Int16x2 => DataType::VEC2S,
            Self::Int32x2 => DataType::VEC2I,
            Self::Float2 => DataType::VEC2F,
        }
    }
}

impl fmt::Display for AttributeDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
