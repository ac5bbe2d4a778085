use tracing::debug;

use crate::embedder::Embedder;
use crate::error::Result;
use crate::index::VectorIndex;
use crate::metadata::MetadataStore;
use crate::models::{ JobRecord, RankedJob };

pub const DEFAULT_TOP_K: usize = 20;

/// Query pipeline: embed the query, search the index, join the metadata.
///
/// Everything it holds is loaded once at startup and never mutated.
pub struct JobSearch {
    metadata: MetadataStore,
    index: VectorIndex,
    embedder: Box<dyn Embedder>,
}

impl JobSearch {
    pub fn new(metadata: MetadataStore, index: VectorIndex, embedder: Box<dyn Embedder>) -> Self {
        Self {
            metadata,
            index,
            embedder,
        }
    }

    /// Ranked records for `query`, closest first. At most `top_k` long; ids the
    /// index knows but the metadata does not are skipped.
    pub fn search_jobs(&self, query: &str, top_k: usize) -> Result<Vec<JobRecord>> {
        Ok(
            self
                .search_neighbors(query, top_k)?
                .into_iter()
                .map(|hit| hit.job)
                .collect()
        )
    }

    /// Same as [`search_jobs`](Self::search_jobs) but keeps the id and distance
    /// of every hit.
    pub fn search_neighbors(&self, query: &str, top_k: usize) -> Result<Vec<RankedJob>> {
        let query_embedding = self.embedder.encode(query)?;
        let neighbors = self.index.search(&query_embedding, top_k)?;
        if neighbors.is_empty() {
            return Ok(Vec::new());
        }

        let mut jobs = Vec::with_capacity(neighbors.len());
        for (distance, id) in neighbors.iter() {
            match self.metadata.get(id) {
                Some(job) =>
                    jobs.push(RankedJob {
                        id,
                        distance,
                        job: job.clone(),
                    }),
                None => debug!("Dropping id {} with no metadata record", id),
            }
        }

        debug!("Query {:?} matched {} of {} neighbors", query, jobs.len(), neighbors.len());
        Ok(jobs)
    }
}
