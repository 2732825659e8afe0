use candle_core::{DType, IndexOp, Tensor, D};
use serde::Deserialize;

#[cfg(feature = "clap")]
use clap::ValueEnum;

use crate::Result;

/// How token embeddings are reduced to one sentence embedding.
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum PoolingStrategy {
    /// Select the CLS token as embedding
    Cls,
    /// Average the token embeddings, ignoring padding
    #[default]
    Mean,
}

/// The `1_Pooling/config.json` file of a SentenceTransformers repository.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct PoolConfig {
    #[serde(default)]
    pooling_mode_cls_token: bool,
    #[serde(default)]
    pooling_mode_mean_tokens: bool,
}

impl PoolConfig {
    /// `None` if the configured mode is one we don't support (max, sqrt-len).
    pub(crate) fn strategy(&self) -> Option<PoolingStrategy> {
        if self.pooling_mode_cls_token {
            Some(PoolingStrategy::Cls)
        } else if self.pooling_mode_mean_tokens {
            Some(PoolingStrategy::Mean)
        } else {
            None
        }
    }
}

impl PoolingStrategy {
    /// Pool `(batch, seq_len, hidden)` token embeddings into `(batch, hidden)`.
    ///
    /// `attention_mask` is `(batch, seq_len)` with ones for real tokens.
    pub(crate) fn pool(&self, embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let pooled = match self {
            PoolingStrategy::Cls => embeddings.i((.., 0))?,
            PoolingStrategy::Mean => {
                let mask = attention_mask
                    .to_dtype(embeddings.dtype())?
                    .unsqueeze(D::Minus1)?;
                let summed = embeddings.broadcast_mul(&mask)?.sum(1)?;
                // every sequence holds at least its CLS token, so counts > 0
                let counts = mask.sum(1)?;
                summed.broadcast_div(&counts)?
            }
        };
        Ok(pooled.to_dtype(DType::F32)?)
    }
}
