//! Command implementations, one module per area.

pub mod exec;
pub mod package;
pub mod virtuals;
pub mod vm;
