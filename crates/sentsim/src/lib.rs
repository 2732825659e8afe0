#![doc = include_str!("../README.md")]

pub mod device;
pub mod embedding;
pub mod encoder;
mod error;
pub mod pooling;
pub mod repo;
pub mod similarity;

mod config;

pub use candle_core::Device;
pub use embedding::{Embed, Embedding};
pub use encoder::SentenceEncoder;
pub use error::{Error, Result};
pub use pooling::PoolingStrategy;
pub use similarity::cosine_similarity;
