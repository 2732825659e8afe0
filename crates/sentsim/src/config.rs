//! Model configuration parsing.
//!
//! The encoder architecture comes from `config.json` at the root of a Hugging Face
//! model repository; the pooling strategy from `1_Pooling/config.json` when present.

use candle_transformers::models::bert::Config as BertConfig;
use candle_transformers::models::jina_bert::Config as JinaBertConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::pooling::{PoolConfig, PoolingStrategy};
use crate::{Error, Result};

/// The fields of `config.json` needed to pick an architecture.
#[derive(Debug, Deserialize)]
struct BaseModelConfig {
    #[serde(default)]
    architectures: Vec<String>,
    model_type: Option<String>,
}

pub(crate) enum EncoderConfig {
    Bert(BertConfig),
    JinaBert(JinaBertConfig),
}

pub(crate) fn parse_model_config(config_str: &str) -> Result<EncoderConfig> {
    let base: BaseModelConfig = serde_json::from_str(config_str)?;

    if base.architectures.iter().any(|arch| arch.starts_with("JinaBert")) {
        return Ok(EncoderConfig::JinaBert(serde_json::from_str(config_str)?));
    }

    let is_bert = base.model_type.as_deref() == Some("bert")
        || base.architectures.iter().any(|arch| arch.starts_with("Bert"));
    if is_bert {
        return Ok(EncoderConfig::Bert(serde_json::from_str(config_str)?));
    }

    Err(Error::InvalidModelConfig(
        "only BERT and JinaBERT models are supported",
    ))
}

/// Pick the pooling strategy: an explicit choice wins, then the repository's
/// pooling config, then mean pooling.
pub(crate) fn resolve_pooling(
    pooling: Option<PoolingStrategy>,
    pooling_config_path: Option<&Path>,
) -> Result<PoolingStrategy> {
    match (pooling, pooling_config_path) {
        (Some(strategy), _) => Ok(strategy),
        (None, Some(path)) => {
            let config: PoolConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
            config
                .strategy()
                .ok_or(Error::ModelLoad("Pooling configuration is not supported"))
        }
        (None, None) => {
            tracing::debug!("No pooling configuration given, using mean pooling");
            Ok(PoolingStrategy::default())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    const MINILM_CONFIG: &str = r#"{
        "_name_or_path": "nreimers/MiniLM-L6-H384-uncased",
        "architectures": ["BertModel"],
        "attention_probs_dropout_prob": 0.1,
        "gradient_checkpointing": false,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "hidden_size": 384,
        "initializer_range": 0.02,
        "intermediate_size": 1536,
        "layer_norm_eps": 1e-12,
        "max_position_embeddings": 512,
        "model_type": "bert",
        "num_attention_heads": 12,
        "num_hidden_layers": 6,
        "pad_token_id": 0,
        "position_embedding_type": "absolute",
        "transformers_version": "4.8.2",
        "type_vocab_size": 2,
        "use_cache": true,
        "vocab_size": 30522
    }"#;

    const JINA_CONFIG: &str = r#"{
        "architectures": ["JinaBertForMaskedLM"],
        "attention_probs_dropout_prob": 0.0,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "hidden_size": 512,
        "initializer_range": 0.02,
        "intermediate_size": 2048,
        "layer_norm_eps": 1e-12,
        "max_position_embeddings": 8192,
        "model_type": "bert",
        "num_attention_heads": 8,
        "num_hidden_layers": 4,
        "pad_token_id": 0,
        "position_embedding_type": "alibi",
        "type_vocab_size": 2,
        "vocab_size": 30528
    }"#;

    #[test]
    fn test_parse_bert_config() -> Result<()> {
        assert!(matches!(
            parse_model_config(MINILM_CONFIG)?,
            EncoderConfig::Bert(_)
        ));
        Ok(())
    }

    #[test]
    fn test_parse_jina_bert_config() -> Result<()> {
        assert!(matches!(
            parse_model_config(JINA_CONFIG)?,
            EncoderConfig::JinaBert(_)
        ));
        Ok(())
    }

    #[test]
    fn test_parse_unsupported_config() {
        let config = r#"{"architectures": ["GPT2LMHeadModel"], "model_type": "gpt2"}"#;
        assert!(matches!(
            parse_model_config(config),
            Err(Error::InvalidModelConfig(_))
        ));
        assert!(matches!(parse_model_config("not json"), Err(Error::Serde(_))));
    }

    #[test]
    fn test_resolve_pooling() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"pooling_mode_cls_token": true, "pooling_mode_mean_tokens": false}"#,
        )?;

        assert_eq!(resolve_pooling(None, Some(&path))?, PoolingStrategy::Cls);
        assert_eq!(
            resolve_pooling(Some(PoolingStrategy::Mean), Some(&path))?,
            PoolingStrategy::Mean
        );
        assert_eq!(resolve_pooling(None, None)?, PoolingStrategy::Mean);

        fs::write(&path, r#"{"pooling_mode_max_tokens": true}"#)?;
        assert!(resolve_pooling(None, Some(&path)).is_err());

        Ok(())
    }
}
