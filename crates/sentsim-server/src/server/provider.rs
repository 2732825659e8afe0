use anyhow::anyhow;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use sentsim::{Embed, Embedding};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;
use tokio::time::Instant;

use crate::server::ServerError;

type Loader = dyn Fn() -> sentsim::Result<Arc<dyn Embed>> + Send + Sync;

/// Outcome of one load attempt, cloned out to every caller waiting on it.
type LoadResult = Result<Arc<dyn Embed>, Arc<anyhow::Error>>;
type LoadAttempt = Shared<BoxFuture<'static, LoadResult>>;

struct Inner {
    model: OnceCell<Arc<dyn Embed>>,
    in_flight: Mutex<Option<LoadAttempt>>,
    loader: Box<Loader>,
}

impl Inner {
    fn in_flight(&self) -> MutexGuard<'_, Option<LoadAttempt>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-wide holder of the embedding model.
///
/// The model is loaded at most once, on the first [`ModelProvider::ensure_loaded`]
/// call. Callers arriving while a load attempt runs share that attempt and its
/// outcome, success or failure. A failed attempt is not cached: the next caller
/// after it starts a new one.
#[derive(Clone)]
pub struct ModelProvider {
    inner: Arc<Inner>,
}

impl ModelProvider {
    /// `loader` blocks (downloads, reads weights) and is run on the blocking pool.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> sentsim::Result<Arc<dyn Embed>> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                model: OnceCell::new(),
                in_flight: Mutex::new(None),
                loader: Box::new(loader),
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.model.initialized()
    }

    pub async fn ensure_loaded(&self) -> Result<Arc<dyn Embed>, ServerError> {
        if let Some(model) = self.inner.model.get() {
            return Ok(Arc::clone(model));
        }

        let attempt = {
            let mut in_flight = self.inner.in_flight();
            if let Some(model) = self.inner.model.get() {
                return Ok(Arc::clone(model));
            }
            in_flight
                .get_or_insert_with(|| start_load(Arc::clone(&self.inner)))
                .clone()
        };

        attempt
            .await
            .map_err(|err| ServerError::ModelUnavailable(anyhow!("{err:#}")))
    }

    /// Embed `sentences`, loading the model first if needed.
    ///
    /// Returns one embedding per sentence, in order, all of one dimension.
    pub async fn embed(&self, sentences: Vec<String>) -> Result<Vec<Embedding>, ServerError> {
        let model = self.ensure_loaded().await?;
        let expected = sentences.len();

        let embeddings = tokio::task::spawn_blocking(move || model.embed(&sentences))
            .await
            .map_err(|err| ServerError::Inference(err.into()))?
            .map_err(|err| ServerError::Inference(err.into()))?;

        if embeddings.len() != expected {
            return Err(ServerError::Inference(anyhow!(
                "expected {expected} embeddings, got {}",
                embeddings.len()
            )));
        }
        if let Some(first) = embeddings.first() {
            if let Some(other) = embeddings.iter().find(|e| e.dim() != first.dim()) {
                return Err(ServerError::Inference(anyhow!(
                    "embedding dimensions differ: {} != {}",
                    first.dim(),
                    other.dim()
                )));
            }
        }

        Ok(embeddings)
    }
}

/// Run the loader on a detached task, so a request dropped mid-load can't
/// cancel the attempt other requests are waiting on.
fn start_load(inner: Arc<Inner>) -> LoadAttempt {
    let handle = tokio::spawn(async move {
        let start = Instant::now();

        let loader = Arc::clone(&inner);
        let result = match tokio::task::spawn_blocking(move || (loader.loader)()).await {
            Ok(Ok(model)) => Ok(model),
            Ok(Err(err)) => Err(Arc::new(anyhow::Error::from(err))),
            Err(err) => Err(Arc::new(anyhow::Error::from(err))),
        };

        match &result {
            Ok(model) => {
                // only one attempt runs at a time, so the cell is still empty
                let _ = inner.model.set(Arc::clone(model));
                tracing::info!(
                    model = model.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Model loaded"
                );
            }
            Err(err) => tracing::warn!("Model load attempt failed: {err:#}"),
        }

        *inner.in_flight() = None;
        result
    });

    async move {
        handle
            .await
            .unwrap_or_else(|err| Err(Arc::new(anyhow::Error::from(err))))
    }
    .boxed()
    .shared()
}
