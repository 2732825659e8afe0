//! Stand-in embedders for exercising the provider and routes without model weights.

use sentsim::{Embed, Embedding};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::server::provider::ModelProvider;

const DIM: usize = 64;

/// Hashes lowercase words into a fixed number of buckets. Sentences sharing
/// words point in similar directions, which is all the routes need.
pub(crate) struct BagOfWordsEmbedder;

impl Embed for BagOfWordsEmbedder {
    fn embed(&self, sentences: &[String]) -> sentsim::Result<Vec<Embedding>> {
        Ok(sentences
            .iter()
            .map(|sentence| {
                let mut values = vec![0.0; DIM];
                for word in sentence.split_whitespace() {
                    values[bucket(&word.to_lowercase())] += 1.0;
                }
                Embedding::new(values)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "bag-of-words"
    }
}

/// FNV-1a, stable across runs unlike the std hasher.
fn bucket(word: &str) -> usize {
    let hash = word
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
            (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
    (hash % DIM as u64) as usize
}

/// Returns one embedding fewer than asked for.
pub(crate) struct ShortEmbedder;

impl Embed for ShortEmbedder {
    fn embed(&self, sentences: &[String]) -> sentsim::Result<Vec<Embedding>> {
        let mut embeddings = BagOfWordsEmbedder.embed(sentences)?;
        embeddings.pop();
        Ok(embeddings)
    }

    fn name(&self) -> &str {
        "short"
    }
}

/// Every call fails, like a backend that errors mid-inference.
pub(crate) struct FailingEmbedder;

impl Embed for FailingEmbedder {
    fn embed(&self, _sentences: &[String]) -> sentsim::Result<Vec<Embedding>> {
        Err(sentsim::Error::Inference(
            "backend crashed at layer 3".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Returns all-zero vectors, for which cosine similarity is undefined.
pub(crate) struct ZeroEmbedder;

impl Embed for ZeroEmbedder {
    fn embed(&self, sentences: &[String]) -> sentsim::Result<Vec<Embedding>> {
        Ok(sentences
            .iter()
            .map(|_| Embedding::new(vec![0.0; DIM]))
            .collect())
    }

    fn name(&self) -> &str {
        "zero"
    }
}

pub(crate) fn provider_with<E>(embedder: E) -> ModelProvider
where
    E: Embed + 'static,
{
    let embedder: Arc<dyn Embed> = Arc::new(embedder);
    ModelProvider::new(move || Ok(Arc::clone(&embedder)))
}

/// A slow-loading bag-of-words provider that counts its loads.
pub(crate) fn counting_provider(loads: Arc<AtomicUsize>) -> ModelProvider {
    ModelProvider::new(move || {
        loads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        Ok(Arc::new(BagOfWordsEmbedder) as Arc<dyn Embed>)
    })
}

/// A slow provider whose every load attempt fails.
pub(crate) fn failing_provider(attempts: Arc<AtomicUsize>) -> ModelProvider {
    ModelProvider::new(move || {
        attempts.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        Err(sentsim::Error::ModelLoad("Repository doesn't contain model weights."))
    })
}
