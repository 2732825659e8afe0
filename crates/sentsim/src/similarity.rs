use crate::{Error, Result};

/// Cosine of the angle between two embeddings.
///
/// Computed as `dot(a, b) / (|a| * |b|)` with `f64` accumulation, and clamped
/// to `[-1, 1]` so rounding never pushes the score out of range.
///
/// # Errors
///
/// * [`Error::DimensionMismatch`] if `a` and `b` differ in length.
/// * [`Error::EmptyEmbedding`] if both are empty.
/// * [`Error::ZeroMagnitude`] if either vector is all zeros, where the angle
///   is undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(Error::EmptyEmbedding);
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, norm_a, norm_b), (&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (dot + x * y, norm_a + x * x, norm_b + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(Error::ZeroMagnitude);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());

    Ok(similarity.clamp(-1.0, 1.0) as f32)
}
