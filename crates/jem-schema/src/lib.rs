//! Descriptor file format for jem.
//!
//! Packages, VMs and virtuals are all described by the same flat
//! `NAME=value` text format. This crate owns that format and the small
//! grammar used inside dependency values; it knows nothing about where
//! descriptors live on disk.

pub mod depend;
pub mod descriptor;

pub use depend::{DependKind, DependToken};
pub use descriptor::{DescriptorError, Param, Params};
