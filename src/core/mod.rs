//! Core layer - host traits and fundamental types.
//!
//! This module provides:
//! - [`PropertyHost`] / [`AttributeHost`] - the interface a host application implements
//! - [`CollectionLocator`] - where a collection lives on a host object
//! - [`AttributeHeader`] - description of an attribute layer
//! - [`Domain`] / [`StorageKind`] / [`AttributeDataKind`] - layer classification

mod header;
mod locator;
mod sample;
mod traits;

pub use header::AttributeHeader;
pub use locator::{CollectionLocator, ATTRIBUTES_COLLECTION};
pub use sample::{AttributeDataKind, Domain, StorageKind};
pub use traits::{
    AttributeHost, PropertyHost, FACES_COLLECTION, LOOP_START_FIELD, LOOP_TOTAL_FIELD,
};
