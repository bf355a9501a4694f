//! Core library: walking, classifying and placing media files.

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hashing;
pub mod models;
pub mod pipeline;
pub mod placement;
pub mod scanner;
pub mod stats;
