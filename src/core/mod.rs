//! Core identification logic.

pub mod disambiguator;
pub mod episode;
pub mod library;
pub mod media_dir;
pub mod nfo;
pub mod pattern;
pub mod resolver;
pub mod scanner;
pub mod searcher;
pub mod strategy;
pub mod terms;
