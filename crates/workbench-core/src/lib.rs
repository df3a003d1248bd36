//! Cross-cutting helpers shared by workbench services.

pub mod bytes;
pub mod serde;
pub mod tracing;
