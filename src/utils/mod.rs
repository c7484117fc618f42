//! Utility modules for the asset bundler.

pub mod path;
