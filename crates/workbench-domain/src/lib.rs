//! Shared domain vocabulary for workbench services.

pub mod id;
pub mod sort;
