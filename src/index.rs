use std::fs;
use std::path::Path;

use serde::{ Deserialize, Serialize };
use tracing::{ info, warn };

use crate::error::{ JobSearchError, Result };
use crate::metadata::MetadataStore;
use crate::models::{ Neighbors, RowId, SENTINEL_ID };

/// Largest neighbor count a single search will answer with.
pub const MAX_TOP_K: usize = 1024;

/// Distance the index was built with.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Squared euclidean distance.
    L2,
    /// Inner product, reported negated so smaller is always closer.
    InnerProduct,
}

impl Metric {
    fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::L2 =>
                a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum(),
            Metric::InnerProduct =>
                -a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| x * y)
                    .sum::<f32>(),
        }
    }
}

/// Flat exact-search index over fixed-dimension vectors.
///
/// The on-disk form is this struct encoded with bincode; `vectors` is
/// row-major with one row per entry of `ids`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VectorIndex {
    dimension: usize,
    metric: Metric,
    ids: Vec<RowId>,
    vectors: Vec<f32>,
}

impl VectorIndex {
    pub fn new(
        dimension: usize,
        metric: Metric,
        ids: Vec<RowId>,
        vectors: Vec<f32>
    ) -> Result<Self> {
        let index = Self { dimension, metric, ids, vectors };
        index.validate()?;
        Ok(index)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| JobSearchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index: VectorIndex = bincode
            ::deserialize(&bytes)
            .map_err(|source| JobSearchError::IndexDecode {
                path: path.to_path_buf(),
                source,
            })?;
        index.validate()?;

        info!(
            "Loaded vector index from {} ({} vectors, dimension {}, {:?})",
            path.display(),
            index.len(),
            index.dimension,
            index.metric
        );
        Ok(index)
    }

    fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(JobSearchError::InvalidIndex("dimension must be non-zero".to_string()));
        }
        if self.vectors.len() != self.ids.len() * self.dimension {
            return Err(
                JobSearchError::InvalidIndex(
                    format!(
                        "{} ids with dimension {} need {} values, found {}",
                        self.ids.len(),
                        self.dimension,
                        self.ids.len() * self.dimension,
                        self.vectors.len()
                    )
                )
            );
        }
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Exact k-nearest-neighbor scan.
    ///
    /// Always answers with exactly `k` slots; when the index holds fewer than
    /// `k` vectors the tail is padded with [`SENTINEL_ID`] at infinite distance.
    /// `k` is capped at [`MAX_TOP_K`].
    pub fn search(&self, query: &[f32], k: usize) -> Result<Neighbors> {
        let k = k.min(MAX_TOP_K);
        if query.len() != self.dimension {
            return Err(JobSearchError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(f32, RowId)> = self.vectors
            .chunks_exact(self.dimension)
            .zip(self.ids.iter().copied())
            .map(|(row, id)| (self.metric.distance(row, query), id))
            .collect();

        // Stable sort keeps insertion order between equal distances.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);

        let mut neighbors = Neighbors {
            distances: Vec::with_capacity(k),
            ids: Vec::with_capacity(k),
        };
        for (distance, id) in scored {
            neighbors.distances.push(distance);
            neighbors.ids.push(id);
        }
        while neighbors.ids.len() < k {
            neighbors.distances.push(f32::INFINITY);
            neighbors.ids.push(SENTINEL_ID);
        }

        Ok(neighbors)
    }
}

/// How well the index and the metadata file agree on their row-ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: usize,
    pub records: usize,
    pub missing_metadata: usize,
    pub unindexed_records: usize,
}

impl IndexReport {
    pub fn compare(index: &VectorIndex, metadata: &MetadataStore) -> Self {
        let missing_metadata = index
            .ids()
            .iter()
            .filter(|id| !metadata.contains(**id))
            .count();
        let indexed: std::collections::HashSet<RowId> = index.ids().iter().copied().collect();
        let unindexed_records = metadata
            .ids()
            .filter(|id| !indexed.contains(id))
            .count();

        Self {
            indexed: index.len(),
            records: metadata.len(),
            missing_metadata,
            unindexed_records,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.missing_metadata == 0 && self.unindexed_records == 0
    }

    pub fn log(&self) {
        if self.is_consistent() {
            info!("Index and metadata agree on {} rows", self.indexed);
        } else {
            warn!(
                "Index and metadata disagree: {} of {} indexed ids have no record, {} of {} records are not indexed; unmatched hits will be dropped",
                self.missing_metadata,
                self.indexed,
                self.unindexed_records,
                self.records
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobRecord;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn line_index() -> VectorIndex {
        // Four points on the x axis at 0, 1, 2, 3.
        VectorIndex::new(
            2,
            Metric::L2,
            vec![10, 11, 12, 13],
            vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0]
        ).expect("valid index")
    }

    #[test]
    fn test_search_orders_by_distance() -> anyhow::Result<()> {
        let index = line_index();
        let neighbors = index.search(&[2.2, 0.0], 3)?;

        assert_eq!(neighbors.ids, vec![12, 13, 11]);
        assert!(
            neighbors.distances.windows(2).all(|w| w[0] <= w[1]),
            "Distances should be ascending: {:?}",
            neighbors.distances
        );
        Ok(())
    }

    #[test]
    fn test_search_pads_with_sentinels() -> anyhow::Result<()> {
        let index = line_index();
        let neighbors = index.search(&[0.0, 0.0], 6)?;

        assert_eq!(neighbors.len(), 6);
        assert_eq!(&neighbors.ids[4..], &[SENTINEL_ID, SENTINEL_ID]);
        assert!(neighbors.distances[5].is_infinite());
        Ok(())
    }

    #[test]
    fn test_huge_k_is_capped() -> anyhow::Result<()> {
        let k = usize::MAX / 4;
        let neighbors = line_index().search(&[0.0, 0.0], k)?;

        assert!(neighbors.len() <= k);
        assert_eq!(neighbors.len(), MAX_TOP_K);
        assert_eq!(&neighbors.ids[..4], &[10, 11, 12, 13]);
        assert!(neighbors.ids[4..].iter().all(|id| *id == SENTINEL_ID));
        Ok(())
    }

    #[test]
    fn test_zero_k_and_empty_index() -> anyhow::Result<()> {
        assert!(line_index().search(&[0.0, 0.0], 0)?.is_empty());

        let empty = VectorIndex::new(2, Metric::L2, vec![], vec![])?;
        let neighbors = empty.search(&[0.0, 0.0], 3)?;
        assert_eq!(neighbors.ids, vec![SENTINEL_ID; 3]);
        Ok(())
    }

    #[test]
    fn test_inner_product_prefers_aligned_vectors() -> anyhow::Result<()> {
        let index = VectorIndex::new(
            2,
            Metric::InnerProduct,
            vec![1, 2, 3],
            vec![1.0, 0.0, 0.0, 1.0, 0.7071, 0.7071]
        )?;
        let neighbors = index.search(&[0.0, 1.0], 3)?;

        assert_eq!(neighbors.ids, vec![2, 3, 1]);
        assert!(neighbors.distances.windows(2).all(|w| w[0] <= w[1]));
        Ok(())
    }

    #[test]
    fn test_ties_keep_insertion_order() -> anyhow::Result<()> {
        let index = VectorIndex::new(1, Metric::L2, vec![5, 4, 3], vec![1.0, -1.0, 1.0])?;
        let neighbors = index.search(&[0.0], 3)?;
        assert_eq!(neighbors.ids, vec![5, 4, 3]);
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = line_index().search(&[1.0, 2.0, 3.0], 2);
        assert!(
            matches!(result, Err(JobSearchError::DimensionMismatch { expected: 2, actual: 3 }))
        );
    }

    #[test]
    fn test_rejects_malformed_shape() {
        let result = VectorIndex::new(3, Metric::L2, vec![1, 2], vec![0.0; 5]);
        assert!(matches!(result, Err(JobSearchError::InvalidIndex(_))));

        let result = VectorIndex::new(0, Metric::L2, vec![], vec![]);
        assert!(matches!(result, Err(JobSearchError::InvalidIndex(_))));
    }

    #[test]
    fn test_load_from_disk() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("job_index.bin");
        fs::write(&path, bincode::serialize(&line_index())?)?;

        let loaded = VectorIndex::load(&path)?;
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.dimension(), 2);
        assert_eq!(loaded.search(&[3.0, 0.0], 1)?.ids, vec![13]);

        fs::write(&path, b"garbage")?;
        assert!(matches!(VectorIndex::load(&path), Err(JobSearchError::IndexDecode { .. })));
        Ok(())
    }

    #[test]
    fn test_report_counts_drift() {
        let record = JobRecord {
            title: "t".to_string(),
            location: "l".to_string(),
            salary: String::new(),
            skills: String::new(),
            category: None,
            job_url: "u".to_string(),
            combined_text: String::new(),
        };
        let metadata = MetadataStore::from_records(
            HashMap::from([
                (10, record.clone()),
                (11, record.clone()),
                (42, record),
            ])
        );

        let report = IndexReport::compare(&line_index(), &metadata);
        assert_eq!(report.missing_metadata, 2);
        assert_eq!(report.unindexed_records, 1);
        assert!(!report.is_consistent());
    }
}
