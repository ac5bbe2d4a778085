use std::path::PathBuf;

use fastembed::{ EmbeddingModel, InitOptions, TextEmbedding };
use tracing::{ debug, info };

use crate::error::{ JobSearchError, Result };

/// Output width of all-MiniLM-L6-v2.
pub const MINILM_DIMENSION: usize = 384;

/// Maps free text to a fixed-dimension vector.
pub trait Embedder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;
}

/// Sentence embedder backed by fastembed's all-MiniLM-L6-v2, the model the
/// job index is built with.
pub struct FastEmbedder {
    model: TextEmbedding,
}

impl FastEmbedder {
    pub fn load(cache_dir: Option<PathBuf>) -> Result<Self> {
        let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(
            true
        );
        if let Some(dir) = cache_dir {
            info!("Using embedding model cache at {}", dir.display());
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options).map_err(|e|
            JobSearchError::Embedding(e.to_string())
        )?;
        info!("Embedding model all-MiniLM-L6-v2 ready");

        Ok(Self { model })
    }
}

impl Embedder for FastEmbedder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.model
            .embed(vec![text], None)
            .map_err(|e| JobSearchError::Embedding(e.to_string()))?;
        let embedding = embeddings
            .pop()
            .ok_or_else(|| JobSearchError::Embedding("model returned no embedding".to_string()))?;

        debug!("Query embedding size: {}", embedding.len());
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }
}
