//! In-memory hosts.
//!
//! Reference implementations of [`PropertyHost`](crate::core::PropertyHost)
//! and [`AttributeHost`](crate::core::AttributeHost) that keep all data in
//! memory. They behave like a modelling application's data model closely
//! enough to drive the proxies in tests and from the command line:
//!
//! - writes to read-only fields (`polygons.area`) are silently dropped
//! - byte color layers store 8 bits per channel
//! - layers are resized along with their domain when topology changes
//!
//! Both hosts lock internally, so proxies share a plain `&` reference.

mod column;
mod mesh;
mod points;
mod store;

pub use column::{Access, ElementTable, FieldColumn};
pub use mesh::{MemoryMesh, EDGE_CREASE_LAYER, UV_LAYER, VERTEX_CREASE_LAYER};
pub use points::{MemoryPointCloud, DEFAULT_RADIUS};
