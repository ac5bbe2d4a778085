use anyhow::{ bail, Context, Result };
use serde::Serialize;
use tracing::{ info, warn };

use crate::config::Settings;
use crate::embedder::{ Embedder, FastEmbedder };
use crate::index::{ IndexReport, VectorIndex };
use crate::insights::InsightReport;
use crate::metadata::MetadataStore;
use crate::models::RankedJob;
use crate::pipeline::JobSearch;
use crate::summarizer::{ ApiKey, OpenAiClient, Summarizer, Summary };

/// What goes where the AI analysis would be.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Narrative {
    Summary {
        summary: Summary,
    },
    /// No key was supplied, so the model was never called.
    MissingCredential,
    /// Nothing matched, so there is nothing to summarize.
    NoResults,
}

/// Everything one search action shows the user.
#[derive(Debug, Serialize, Clone)]
pub struct Page {
    pub query: String,
    pub results: Vec<RankedJob>,
    pub insights: Option<InsightReport>,
    pub narrative: Narrative,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Shared read-only state plus the outbound summarizer.
pub struct App {
    search: JobSearch,
    summarizer: Summarizer,
}

/// Loads the metadata, the index and the embedding model, in that order.
/// Any failure here is fatal.
pub fn bootstrap(settings: &Settings) -> Result<App> {
    let metadata = MetadataStore::load(&settings.metadata).with_context(||
        format!("failed to load job metadata from {}", settings.metadata.display())
    )?;
    let index = VectorIndex::load(&settings.index).with_context(||
        format!("failed to load vector index from {}", settings.index.display())
    )?;
    if metadata.is_empty() || index.is_empty() {
        warn!(
            "Searching an empty corpus ({} records, {} vectors); every query will come back empty",
            metadata.len(),
            index.len()
        );
    }
    IndexReport::compare(&index, &metadata).log();

    let embedder = FastEmbedder::load(settings.model_cache_dir()).context(
        "failed to load the embedding model"
    )?;
    if embedder.dimension() != index.dimension() {
        bail!(
            "embedding model produces {}-dimension vectors but the index holds {}-dimension vectors",
            embedder.dimension(),
            index.dimension()
        );
    }

    let summarizer = Summarizer::new(
        Box::new(OpenAiClient::new(settings.api_base.clone(), settings.model.clone()))
    );
    info!("Ready: {} postings searchable", index.len());

    Ok(App::new(JobSearch::new(metadata, index, Box::new(embedder)), summarizer))
}

impl App {
    pub fn new(search: JobSearch, summarizer: Summarizer) -> Self {
        Self { search, summarizer }
    }

    /// One user search: retrieve, derive the insights, then summarize if a
    /// key is present and something matched.
    pub async fn run_search(&self, query: &str, top_k: usize, api_key: Option<&ApiKey>) -> Result<Page> {
        info!("Searching for {:?} (top {})", query, top_k);
        let results = self.search.search_neighbors(query, top_k)?;

        if results.is_empty() {
            return Ok(Page {
                query: query.to_string(),
                results,
                insights: None,
                narrative: Narrative::NoResults,
            });
        }

        let records: Vec<_> = results
            .iter()
            .map(|hit| hit.job.clone())
            .collect();
        let insights = InsightReport::from_records(&records);

        let narrative = match api_key.filter(|key| !key.is_empty()) {
            Some(key) =>
                Narrative::Summary {
                    summary: self.summarizer.summarize(&records, query, key).await,
                },
            None => Narrative::MissingCredential,
        };

        Ok(Page {
            query: query.to_string(),
            results,
            insights: Some(insights),
            narrative,
        })
    }
}
