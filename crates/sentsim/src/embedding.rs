use std::ops::Deref;

use crate::Result;

/// A single sentence embedding.
///
/// All embeddings produced by one [`Embed`] implementation share the same
/// dimensionality, which is fixed by the underlying model.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Deref for Embedding {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Anything that turns sentences into embeddings.
///
/// Implementations return exactly one embedding per input sentence, in input
/// order. Calls may block for a while (model inference), so async callers
/// should run them on a blocking thread.
pub trait Embed: Send + Sync {
    fn embed(&self, sentences: &[String]) -> Result<Vec<Embedding>>;

    /// Human readable name of the model backing this embedder.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_embedding_accessors() {
        let embedding = Embedding::from(vec![0.5, -1.0, 2.0]);
        assert_eq!(embedding.dim(), 3);
        assert_eq!(embedding.as_slice(), &[0.5, -1.0, 2.0]);
        assert_eq!(embedding.iter().copied().sum::<f32>(), 1.5);
    }
}
