//! Vector normalization, pooling and distance functions.

/// Compute the L2 (Euclidean) norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// L2-normalize a vector in-place. Zero vectors remain zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Squared Euclidean distance between two equal-length vectors.
///
/// Callers guarantee equal lengths; extra components of the longer slice are
/// ignored.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have equal dimensions");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// Attention-masked mean pooling over one sequence of token states.
///
/// `hidden` is `seq_len * hidden_dim` floats for a single batch item and
/// `mask` has `seq_len` entries. Padding positions (mask 0) are skipped. A
/// fully masked sequence pools to the zero vector.
pub fn mean_pool(hidden: &[f32], mask: &[i64], hidden_dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden_dim];
    let mut count = 0.0f32;
    for (token, &m) in hidden.chunks_exact(hidden_dim).zip(mask.iter()) {
        if m == 0 {
            continue;
        }
        count += 1.0;
        for (acc, x) in pooled.iter_mut().zip(token) {
            *acc += x;
        }
    }
    if count > 0.0 {
        for x in &mut pooled {
            *x /= count;
        }
    }
    pooled
}
