//! Flat (brute-force) L2 index.

use std::collections::BTreeMap;
use std::ops::Range;

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::error::{RagError, Result};
use crate::types::{ChunkMetadata, SearchResult};

use super::squared_l2;

/// Exact L2 index with a parallel metadata table.
///
/// Vectors are stored contiguously; vector-id `i` occupies `data[i * dim..(i + 1) * dim]` and is
/// the key of its metadata record. Ids are contiguous from 0 in insertion order. The dimension
/// is unset while the index is empty and fixed by the first accepted batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatIndex {
    dimension: Option<usize>,
    data: Vec<f32>,
    metadata: BTreeMap<u64, ChunkMetadata>,
}

impl FlatIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an index from persisted parts, rejecting anything that breaks the id invariant.
    ///
    /// # Errors
    /// Returns [`RagError::Corrupted`] when the data length is not a multiple of `dimension`,
    /// the vector and metadata counts differ, or metadata ids are not `0..len`.
    pub fn from_parts(
        dimension: usize,
        data: Vec<f32>,
        metadata: BTreeMap<u64, ChunkMetadata>,
    ) -> Result<Self> {
        if data.is_empty() && metadata.is_empty() {
            return Ok(Self::new());
        }
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(RagError::Corrupted(format!(
                "vector data of length {} does not divide into dimension {dimension}",
                data.len()
            )));
        }
        let count = data.len() / dimension;
        if count != metadata.len() {
            return Err(RagError::Corrupted(format!(
                "{count} vectors but {} metadata entries",
                metadata.len()
            )));
        }
        if metadata.keys().zip(0u64..).any(|(id, expected)| *id != expected) {
            return Err(RagError::Corrupted(
                "metadata ids are not contiguous from 0".into(),
            ));
        }
        Ok(Self {
            dimension: Some(dimension),
            data,
            metadata,
        })
    }

    /// Fixed vector dimension, or `None` while empty.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// Returns `true` if no vector has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Raw contiguous vector data.
    #[must_use]
    pub fn vectors(&self) -> &[f32] {
        &self.data
    }

    /// Metadata table keyed by vector-id.
    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<u64, ChunkMetadata> {
        &self.metadata
    }

    /// Metadata for one vector-id.
    #[must_use]
    pub fn metadata(&self, id: u64) -> Option<&ChunkMetadata> {
        self.metadata.get(&id)
    }

    /// Vector for one vector-id.
    #[must_use]
    pub fn vector(&self, id: u64) -> Option<&[f32]> {
        let dim = self.dimension?;
        let start = usize::try_from(id).ok()?.checked_mul(dim)?;
        self.data.get(start..start.checked_add(dim)?)
    }

    /// Distinct source files with the number of chunks stored for each.
    #[must_use]
    pub fn sources(&self) -> BTreeMap<String, usize> {
        let mut sources = BTreeMap::new();
        for metadata in self.metadata.values() {
            *sources.entry(metadata.source_file.clone()).or_insert(0) += 1;
        }
        sources
    }

    /// Appends a batch and returns the vector-ids it was assigned.
    ///
    /// An empty batch is a no-op. The first non-empty batch fixes the dimension.
    ///
    /// # Errors
    /// Returns [`RagError::DimensionMismatch`] if any vector disagrees with the index dimension
    /// (or with the rest of a first batch) and [`RagError::Index`] for zero-length vectors or a
    /// metadata count that differs from the vector count. The index is unchanged on error.
    pub fn add(&mut self, vectors: &[Vec<f32>], metadatas: Vec<ChunkMetadata>) -> Result<Range<u64>> {
        let next_id = self.len() as u64;
        let Some(first) = vectors.first() else {
            return Ok(next_id..next_id);
        };
        if vectors.len() != metadatas.len() {
            return Err(RagError::Index(format!(
                "{} vectors but {} metadata records",
                vectors.len(),
                metadatas.len()
            )));
        }

        let dim = self.dimension.unwrap_or(first.len());
        if dim == 0 {
            return Err(RagError::Index("vectors must not be empty".into()));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(RagError::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }

        self.dimension = Some(dim);
        self.data.reserve(vectors.len() * dim);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        let end = next_id + vectors.len() as u64;
        self.metadata.extend((next_id..end).zip(metadatas));
        Ok(next_id..end)
    }

    /// Exact search returning up to `top_k` hits by ascending squared L2 distance.
    ///
    /// Equal distances are ordered by ascending vector-id. An empty index yields no results for
    /// any query.
    ///
    /// # Errors
    /// Returns [`RagError::DimensionMismatch`] if the query length differs from the index
    /// dimension.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let Some(dim) = self.dimension else {
            return Ok(Vec::new());
        };
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != dim {
            return Err(RagError::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(OrderedFloat<f32>, u64)> = self
            .data
            .par_chunks_exact(dim)
            .enumerate()
            .map(|(id, vector)| (OrderedFloat(squared_l2(vector, query)), id as u64))
            .collect();

        if top_k < scored.len() {
            scored.select_nth_unstable(top_k);
            scored.truncate(top_k);
        }
        scored.sort_unstable();

        Ok(scored
            .into_iter()
            .filter_map(|(distance, id)| {
                self.metadata.get(&id).map(|metadata| SearchResult {
                    score: distance.into_inner(),
                    metadata: metadata.clone(),
                })
            })
            .collect())
    }
}
