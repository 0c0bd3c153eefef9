//! Flat exact nearest-neighbour index.
//!
//! Vectors are stored contiguously; position `i` is the `i`-th inserted vector.
//! Search is brute force over squared Euclidean distance with ties broken by
//! position, so results never depend on selection internals.

use std::cmp::Ordering;

use agrinova_embeddings::EmbeddingError;
use agrinova_embeddings::normalize::squared_euclidean;

use crate::errors::{Result, RetrievalError};

/// One search hit: a stored position and its distance to the query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Insertion position of the stored vector.
    pub position: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// Immutable vector index.
#[derive(Clone, Debug, Default)]
pub enum RetrievalIndex {
    /// No vectors. Every search returns nothing.
    #[default]
    Empty,
    /// At least one vector of `dimensions` components.
    Ready {
        /// Components per vector.
        dimensions: usize,
        /// `len * dimensions` floats, row-major.
        vectors: Vec<f32>,
        /// Number of stored vectors.
        len: usize,
    },
}

impl RetrievalIndex {
    /// Build from vectors that must all have `dimensions` components.
    ///
    /// An empty input gives [`RetrievalIndex::Empty`].
    pub fn build(dimensions: usize, rows: Vec<Vec<f32>>) -> Result<Self> {
        if rows.is_empty() {
            return Ok(Self::Empty);
        }
        if dimensions == 0 {
            return Err(RetrievalError::Build("dimensions must be positive".into()));
        }

        let len = rows.len();
        let mut vectors = Vec::with_capacity(len * dimensions);
        for (position, row) in rows.into_iter().enumerate() {
            if row.len() != dimensions {
                return Err(RetrievalError::Build(format!(
                    "vector {position} has {} dimensions, expected {dimensions}",
                    row.len()
                )));
            }
            vectors.extend(row);
        }

        Ok(Self::Ready {
            dimensions,
            vectors,
            len,
        })
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Ready { len, .. } => *len,
        }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension, if any vectors are stored.
    pub fn dimensions(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Ready { dimensions, .. } => Some(*dimensions),
        }
    }

    /// Return the `top_k` nearest stored vectors, closest first.
    ///
    /// Returns `min(top_k, len)` neighbours. A query of the wrong dimension is
    /// an embedding error; an empty index or `top_k == 0` returns nothing.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Neighbor>> {
        let Self::Ready {
            dimensions,
            vectors,
            len,
        } = self
        else {
            return Ok(Vec::new());
        };
        if top_k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != *dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: *dimensions,
                actual: query.len(),
            }
            .into());
        }

        let mut neighbors: Vec<Neighbor> = vectors
            .chunks_exact(*dimensions)
            .enumerate()
            .map(|(position, stored)| Neighbor {
                position,
                distance: squared_euclidean(query, stored),
            })
            .collect();

        let k = top_k.min(*len);
        if k < neighbors.len() {
            let _ = neighbors.select_nth_unstable_by(k - 1, compare);
            neighbors.truncate(k);
        }
        neighbors.sort_unstable_by(compare);
        Ok(neighbors)
    }
}

/// Total order: distance ascending, then position ascending.
fn compare(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.position.cmp(&b.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn index(rows: &[&[f32]]) -> RetrievalIndex {
        let dims = rows.first().map_or(0, |r| r.len());
        RetrievalIndex::build(dims, rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn empty_input_gives_empty_variant() {
        let idx = RetrievalIndex::build(4, Vec::new()).unwrap();
        assert_matches!(idx, RetrievalIndex::Empty);
        assert!(idx.is_empty());
        assert_eq!(idx.dimensions(), None);
        assert!(idx.search(&[0.0; 4], 4).unwrap().is_empty());
    }

    #[test]
    fn empty_index_accepts_any_query_dimension() {
        let idx = RetrievalIndex::Empty;
        assert!(idx.search(&[1.0, 2.0, 3.0], 10).unwrap().is_empty());
    }

    #[test]
    fn build_rejects_ragged_vectors() {
        let err = RetrievalIndex::build(2, vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert_matches!(err, RetrievalError::Build(msg) if msg.contains("vector 1"));
    }

    #[test]
    fn build_rejects_zero_dimensions() {
        assert!(RetrievalIndex::build(0, vec![vec![]]).is_err());
    }

    #[test]
    fn nearest_first() {
        let idx = index(&[&[0.0, 0.0], &[5.0, 0.0], &[1.0, 0.0]]);
        let hits = idx.search(&[0.9, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![2, 0, 1]);
        assert!((hits[0].distance - 0.01).abs() < 1e-5);
    }

    #[test]
    fn result_count_is_min_of_k_and_len() {
        let idx = index(&[&[0.0], &[1.0], &[2.0]]);
        assert_eq!(idx.search(&[0.0], 2).unwrap().len(), 2);
        assert_eq!(idx.search(&[0.0], 3).unwrap().len(), 3);
        assert_eq!(idx.search(&[0.0], 50).unwrap().len(), 3);
        assert!(idx.search(&[0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn ties_break_by_position() {
        let idx = index(&[&[1.0, 0.0], &[0.0, 1.0], &[-1.0, 0.0], &[0.0, -1.0]]);
        let hits = idx.search(&[0.0, 0.0], 4).unwrap();
        let positions: Vec<usize> = hits.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);

        let hits = idx.search(&[0.0, 0.0], 2).unwrap();
        let positions: Vec<usize> = hits.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn duplicate_vectors_keep_insertion_order() {
        let idx = index(&[&[3.0], &[1.0], &[1.0], &[1.0]]);
        let hits = idx.search(&[1.0], 2).unwrap();
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits[1].position, 2);
    }

    #[test]
    fn wrong_query_dimension_is_embedding_error() {
        let idx = index(&[&[0.0, 0.0]]);
        let err = idx.search(&[0.0, 0.0, 0.0], 1).unwrap_err();
        assert_matches!(
            err,
            RetrievalError::Embedding(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn positions_always_in_bounds() {
        let idx = index(&[&[0.0], &[1.0]]);
        for k in 0..5 {
            for hit in idx.search(&[0.5], k).unwrap() {
                assert!(hit.position < idx.len());
            }
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn corpus() -> impl Strategy<Value = (usize, Vec<Vec<f32>>)> {
            (1usize..6).prop_flat_map(|dims| {
                (
                    Just(dims),
                    proptest::collection::vec(
                        proptest::collection::vec(-4.0f32..4.0, dims),
                        0..24,
                    ),
                )
            })
        }

        proptest! {
            #[test]
            fn never_more_than_min_k_len((dims, rows) in corpus(), k in 0usize..40) {
                let n = rows.len();
                let idx = RetrievalIndex::build(dims, rows).unwrap();
                let hits = idx.search(&vec![0.0; dims], k).unwrap();
                prop_assert_eq!(hits.len(), k.min(n));
            }

            #[test]
            fn sorted_by_distance_then_position((dims, rows) in corpus(), k in 1usize..40) {
                let idx = RetrievalIndex::build(dims, rows).unwrap();
                let hits = idx.search(&vec![0.5; dims], k).unwrap();
                for pair in hits.windows(2) {
                    prop_assert!(pair[0].distance <= pair[1].distance);
                    if pair[0].distance == pair[1].distance {
                        prop_assert!(pair[0].position < pair[1].position);
                    }
                }
            }

            #[test]
            fn stored_vector_is_top_hit((dims, rows) in corpus(), pick in any::<prop::sample::Index>()) {
                prop_assume!(!rows.is_empty());
                let target = pick.index(rows.len());
                let query = rows[target].clone();
                let idx = RetrievalIndex::build(dims, rows).unwrap();
                let hits = idx.search(&query, 1).unwrap();
                prop_assert_eq!(hits[0].distance, 0.0);
                prop_assert!(hits[0].position <= target);
            }

            #[test]
            fn top_k_is_prefix_of_full_ranking((dims, rows) in corpus(), k in 1usize..40) {
                let n = rows.len();
                let idx = RetrievalIndex::build(dims, rows).unwrap();
                let query = vec![-0.25; dims];
                let full = idx.search(&query, n.max(1)).unwrap();
                let partial = idx.search(&query, k).unwrap();
                prop_assert_eq!(&full[..partial.len()], &partial[..]);
            }
        }
    }
}
