//! Media Identifier Library
//!
//! Works out which film or TV episode a media file is from its name, its
//! directory and sidecar NFO files, then resolves full metadata through
//! caching stores and metadata sources.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod services;

pub use error::{Error, Result};
