//! Utility types and functions for meshbuf.
//!
//! This module contains fundamental types used throughout the library:
//! - [`PlainOldDataType`] - Enum of component types
//! - [`DataType`] - POD + extent, the resolved schema of a field
//! - [`ComponentVec`] / [`Components`] / [`ComponentsMut`] - flat component storage and transfer slices
//! - [`Dimensions`] - buffer shape
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and [`Matrix`]

mod pod;
mod data_type;
mod error;
mod math;
mod dimensions;

pub use pod::*;
pub use data_type::*;
pub use error::*;
pub use math::*;
pub use dimensions::*;
