use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{ JobSearchError, Result };
use crate::models::{ JobRecord, RowId };

/// Read-only row-id to job record mapping, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    records: HashMap<RowId, JobRecord>,
}

impl MetadataStore {
    /// Loads a JSON object keyed by decimal row-id.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| JobSearchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: HashMap<RowId, JobRecord> = serde_json
            ::from_str(&raw)
            .map_err(|source| JobSearchError::Metadata {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded {} job records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    pub fn from_records(records: HashMap<RowId, JobRecord>) -> Self {
        Self { records }
    }

    pub fn get(&self, id: RowId) -> Option<&JobRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.records.keys().copied()
    }
}
