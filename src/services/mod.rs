//! Metadata collaborators: sources, stores and the built-in stores.

pub mod json_store;
pub mod memory_store;
pub mod source;
pub mod store;
