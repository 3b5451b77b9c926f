//! # meshbuf
//!
//! Bulk numeric buffers over the element collections of a 3D modelling
//! host (vertices, edges, faces, face corners and attribute layers).
//!
//! Reading or writing a field element by element through a host API is
//! slow. A proxy instead pulls one field of every element into a flat,
//! typed buffer with a single transfer, lets you work on it as a whole
//! (indexing, iteration, matrix transforms, arithmetic) and pushes it back
//! with a single transfer.
//!
//! ## Modules
//!
//! - [`util`] - Component types, schemas, shapes, errors and matrices
//! - [`core`] - Host traits, locators and attribute layer descriptions
//! - [`buffer`] - [`BufferProxy`] for one field of one collection
//! - [`unified`] - [`UnifiedAttributeProxy`] for attribute layers of any supported domain
//! - [`host`] - In-memory mesh and point cloud hosts
//!
//! ## Example
//!
//! ```ignore
//! use meshbuf::prelude::*;
//!
//! let mesh = MemoryMesh::cube()?;
//! let mut position = UnifiedAttributeProxy::new(&mesh, "position", None)?;
//!
//! position.extend(false)?;
//! position.matmul_assign(Mat4::from_translation(Vec3::Z).transpose())?;
//! position.discard()?;
//! position.set()?;
//! ```

pub mod util;
pub mod core;
pub mod buffer;
pub mod unified;
pub mod host;

// Re-export commonly used types
pub use util::{DataType, PlainOldDataType, Error, Result};
pub use buffer::BufferProxy;
pub use unified::UnifiedAttributeProxy;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Bool, DataType, Error, Matrix, PlainOldDataType, Result};
    pub use crate::util::{Mat2, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
    pub use crate::core::{
        AttributeDataKind, AttributeHeader, AttributeHost, CollectionLocator, Domain,
        PropertyHost, StorageKind,
    };
    pub use crate::buffer::{Array, BufferProxy, Operand};
    pub use crate::unified::{AttributeSelector, UnifiedAttributeProxy};
    pub use crate::host::{MemoryMesh, MemoryPointCloud};
}
