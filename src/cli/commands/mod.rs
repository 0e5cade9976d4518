//! CLI command implementations.

pub mod classify;
pub mod identify;
pub mod parse;
pub mod search;
