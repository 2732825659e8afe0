use candle_core::{DType, Device, Module, Tensor};
use candle_nn::VarBuilder;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};

// Re-exports
pub use candle_transformers::models::{bert::BertModel, jina_bert::BertModel as JinaBertModel};

use crate::config::{parse_model_config, resolve_pooling, EncoderConfig};
use crate::device::DEVICE;
use crate::repo::{ModelRepo, ModelRepoFiles, ModelWeightsPath};
use crate::{Embed, Embedding, Error, PoolingStrategy, Result};

/// A transformer that maps token ids to per-token hidden states.
pub trait EncoderModel: Send + Sync {
    /// `(batch, seq_len)` token ids to `(batch, seq_len, hidden)` states.
    fn encode(&self, token_ids: &Tensor) -> Result<Tensor>;
}

impl EncoderModel for BertModel {
    fn encode(&self, token_ids: &Tensor) -> Result<Tensor> {
        let token_type_ids = token_ids.zeros_like()?;
        Ok(self.forward(token_ids, &token_type_ids)?)
    }
}

impl EncoderModel for JinaBertModel {
    fn encode(&self, token_ids: &Tensor) -> Result<Tensor> {
        Ok(self.forward(token_ids)?)
    }
}

fn load_model(
    weights: ModelWeightsPath,
    config: EncoderConfig,
    device: &Device,
) -> Result<Box<dyn EncoderModel>> {
    let vb = match weights {
        ModelWeightsPath::Pth(path) => VarBuilder::from_pth(&path, DType::F32, device)?,
        ModelWeightsPath::Safetensors(path) => unsafe {
            VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)?
        },
    };

    Ok(match config {
        EncoderConfig::Bert(cfg) => Box::new(BertModel::load(vb, &cfg)?),
        EncoderConfig::JinaBert(cfg) => Box::new(JinaBertModel::new(vb, &cfg)?),
    })
}

/// A pretrained sentence encoder: tokenizer, transformer and pooling.
pub struct SentenceEncoder {
    model: Box<dyn EncoderModel>,
    tokenizer: Tokenizer,
    pooling: PoolingStrategy,
    device: Device,
    name: String,
}

impl SentenceEncoder {
    pub fn builder() -> SentenceEncoderBuilder<Uninitialised> {
        SentenceEncoderBuilder::new()
    }

    fn from_model_repo(
        model_repo: &ModelRepo,
        device: Device,
        pooling: Option<PoolingStrategy>,
    ) -> Result<Self> {
        let span = tracing::span!(tracing::Level::TRACE, "encoder-load");
        let _enter = span.enter();

        let ModelRepoFiles {
            config,
            tokenizer,
            weights,
            pooling_config,
        } = model_repo.file_paths()?;

        let encoder_config = parse_model_config(&fs::read_to_string(config)?)?;
        let pooling = resolve_pooling(pooling, pooling_config.as_deref())?;

        let mut tokenizer = Tokenizer::from_file(tokenizer)?;
        match tokenizer.get_padding_mut() {
            Some(pp) => pp.strategy = PaddingStrategy::BatchLongest,
            None => {
                tokenizer.with_padding(Some(PaddingParams {
                    strategy: PaddingStrategy::BatchLongest,
                    ..Default::default()
                }));
            }
        }

        let model = load_model(weights, encoder_config, &device)?;
        let name = model_repo.name();
        tracing::debug!("Loaded {name} with {pooling:?} pooling");

        Ok(Self {
            model,
            tokenizer,
            pooling,
            device,
            name,
        })
    }
}

impl Embed for SentenceEncoder {
    fn embed(&self, sentences: &[String]) -> Result<Vec<Embedding>> {
        let span = tracing::span!(tracing::Level::TRACE, "encoder-embed");
        let _enter = span.enter();

        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self.tokenizer.encode_batch(sentences.to_vec(), true)?;

        let token_ids = encodings
            .iter()
            .map(|encoding| Tensor::new(encoding.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let attention_mask = encodings
            .iter()
            .map(|encoding| Tensor::new(encoding.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let token_ids = Tensor::stack(&token_ids, 0)?;
        let attention_mask = Tensor::stack(&attention_mask, 0)?;

        tracing::trace!("running inference on batch {:?}", token_ids.shape());

        let hidden_states = self.model.encode(&token_ids)?;
        let pooled = self.pooling.pool(&hidden_states, &attention_mask)?;

        tracing::trace!("generated embeddings {:?}", pooled.shape());

        let rows = pooled.to_vec2::<f32>()?;
        if rows.len() != sentences.len() {
            return Err(Error::Inference(format!(
                "model returned {} embeddings for {} sentences",
                rows.len(),
                sentences.len()
            )));
        }

        Ok(rows.into_iter().map(Embedding::from).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub trait BuilderState {}

pub struct Uninitialised;
pub struct Initialised;

impl BuilderState for Uninitialised {}
impl BuilderState for Initialised {}

/// Builds a [`SentenceEncoder`]. A model source must be set before `build`.
pub struct SentenceEncoderBuilder<S>
where
    S: BuilderState,
{
    model_repo: Option<ModelRepo>,
    pooling: Option<PoolingStrategy>,
    device: Device,
    _marker: PhantomData<S>,
}

impl Default for SentenceEncoderBuilder<Uninitialised> {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceEncoderBuilder<Uninitialised> {
    pub fn new() -> Self {
        Self {
            model_repo: None,
            pooling: None,
            device: Device::clone(&DEVICE),
            _marker: PhantomData,
        }
    }
}

impl<S> SentenceEncoderBuilder<S>
where
    S: BuilderState,
{
    /// Use a Hugging Face Hub repository, given as `repo_id[:revision]`.
    pub fn with_model_repo<MR: AsRef<str>>(
        self,
        model_repo: MR,
    ) -> Result<SentenceEncoderBuilder<Initialised>> {
        let model_repo = ModelRepo::from_repo_string(model_repo.as_ref())?;
        Ok(self.with_source(model_repo))
    }

    /// Use a local folder laid out like a Hugging Face repository.
    pub fn with_model_folder<P: AsRef<Path>>(
        self,
        model_folder: P,
    ) -> SentenceEncoderBuilder<Initialised> {
        self.with_source(ModelRepo::from_path(model_folder))
    }

    fn with_source(self, model_repo: ModelRepo) -> SentenceEncoderBuilder<Initialised> {
        SentenceEncoderBuilder::<Initialised> {
            model_repo: Some(model_repo),
            pooling: self.pooling,
            device: self.device,
            _marker: PhantomData,
        }
    }

    /// Override the pooling strategy from the repository's pooling config.
    pub fn with_pooling_strategy(self, pooling: Option<PoolingStrategy>) -> Self {
        Self { pooling, ..self }
    }

    pub fn with_device(self, device: Device) -> Self {
        Self { device, ..self }
    }
}

impl SentenceEncoderBuilder<Initialised> {
    pub fn build(self) -> Result<SentenceEncoder> {
        match self.model_repo {
            None => Err(Error::ModelLoad("No model directory or repository given.")),
            Some(model_repo) => {
                SentenceEncoder::from_model_repo(&model_repo, self.device, self.pooling)
            }
        }
    }
}
