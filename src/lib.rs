//! Semantic job search over a prebuilt vector index, with market insights
//! and an optional chat-model analysis of the matching postings.

pub mod app;
pub mod config;
pub mod embedder;
pub mod error;
pub mod index;
pub mod insights;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod summarizer;
#[cfg(test)]
mod test_utils;

pub use app::{ bootstrap, App, Narrative, Page };
pub use error::{ JobSearchError, Result };
pub use models::JobRecord;
pub use pipeline::{ JobSearch, DEFAULT_TOP_K };
