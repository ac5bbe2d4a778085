//! Fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::{ Arc, Mutex };

use crate::embedder::Embedder;
use crate::error::Result;
use crate::metadata::MetadataStore;
use crate::models::{ JobRecord, RowId };

pub fn job(title: &str, location: &str, skills: &str) -> JobRecord {
    JobRecord {
        title: title.to_string(),
        location: location.to_string(),
        salary: String::new(),
        skills: skills.to_string(),
        category: None,
        job_url: format!("https://jobs.example/{}", title.to_lowercase().replace(' ', "-")),
        combined_text: format!("{} in {}. Skills: {}", title, location, skills),
    }
}

pub fn metadata_with(records: Vec<(RowId, JobRecord)>) -> MetadataStore {
    MetadataStore::from_records(records.into_iter().collect::<HashMap<_, _>>())
}

/// Returns the same vector for every text and remembers what it was asked.
pub struct StubEmbedder {
    vector: Vec<f32>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl StubEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn seen(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.seen)
    }
}

impl Embedder for StubEmbedder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.seen.lock().unwrap().push(text.to_string());
        Ok(self.vector.clone())
    }

    fn dimension(&self) -> usize {
        self.vector.len()
    }
}
