use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

const SAFETENSORS_FILE: &str = "model.safetensors";
const PTH_FILE: &str = "pytorch_model.bin";
const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const POOLING_CONFIG_FILE: &str = "1_Pooling/config.json";

/// Where a pretrained model comes from: a local folder laid out like a Hugging Face
/// repository, or a repository on the Hub (downloaded into the local HF cache).
pub enum ModelRepo {
    Folder(PathBuf),
    ApiRepo { id: String, repo: Box<ApiRepo> },
}

impl ModelRepo {
    pub fn from_path<P>(root: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self::Folder(root.as_ref().to_owned())
    }

    /// Build from a `repo_id[:revision]` string, e.g.
    /// `sentence-transformers/all-MiniLM-L6-v2:refs/pr/21`.
    pub fn from_repo_string(repo_string: &str) -> Result<Self> {
        let (repo_id, revision) = parse_repo_string(repo_string)?;
        let repo = Repo::with_revision(repo_id.to_owned(), RepoType::Model, revision.to_owned());
        let api = Api::new()?;

        Ok(Self::ApiRepo {
            id: repo_id.to_owned(),
            repo: Box::new(api.repo(repo)),
        })
    }

    pub fn name(&self) -> String {
        match self {
            ModelRepo::Folder(path) => path.display().to_string(),
            ModelRepo::ApiRepo { id, .. } => id.clone(),
        }
    }

    /// Resolve the files needed to build an encoder.
    ///
    /// **Warning**: downloads the model weights when they are not yet in the
    /// Hugging Face cache.
    pub(crate) fn file_paths(&self) -> Result<ModelRepoFiles> {
        let root = match self {
            ModelRepo::Folder(path) => path.to_owned(),
            ModelRepo::ApiRepo { id, repo } => {
                tracing::info!("Fetching model files for {id}");

                let model_path = repo
                    .get(SAFETENSORS_FILE)
                    .or_else(|_| repo.get(PTH_FILE))?;
                repo.get(CONFIG_FILE)?;
                repo.get(TOKENIZER_FILE)?;

                if repo.get(POOLING_CONFIG_FILE).is_err() {
                    tracing::info!("No pooling configuration found. Using default or given strategy.");
                }

                model_path
                    .parent()
                    .ok_or(Error::ModelLoad("Model path has no parent directory"))?
                    .to_owned()
            }
        };

        let config = root.join(CONFIG_FILE);
        let tokenizer = root.join(TOKENIZER_FILE);
        if !config.exists() || !tokenizer.exists() {
            return Err(Error::ModelLoad("Repository misses configuration files."));
        }

        // Safetensors get precedence over pth.
        let weights = if root.join(SAFETENSORS_FILE).exists() {
            ModelWeightsPath::Safetensors(root.join(SAFETENSORS_FILE))
        } else if root.join(PTH_FILE).exists() {
            ModelWeightsPath::Pth(root.join(PTH_FILE))
        } else {
            return Err(Error::ModelLoad("Repository doesn't contain model weights."));
        };

        let pooling_config = Some(root.join(POOLING_CONFIG_FILE)).filter(|p| p.exists());

        Ok(ModelRepoFiles {
            config,
            tokenizer,
            weights,
            pooling_config,
        })
    }
}

pub(crate) struct ModelRepoFiles {
    pub(crate) config: PathBuf,
    pub(crate) tokenizer: PathBuf,
    pub(crate) weights: ModelWeightsPath,
    pub(crate) pooling_config: Option<PathBuf>,
}

#[derive(Debug)]
pub(crate) enum ModelWeightsPath {
    Pth(PathBuf),
    Safetensors(PathBuf),
}

/// Split `repo_id[:revision]`, defaulting the revision to `main`.
pub fn parse_repo_string(repo_string: &str) -> Result<(&str, &str)> {
    if repo_string.is_empty() {
        return Err(Error::InvalidModelName("Model repository string is empty"));
    }

    const ILLEGAL_CHARS: [char; 6] = ['\\', '<', '>', '|', '?', '*'];
    if repo_string.chars().any(|c| ILLEGAL_CHARS.contains(&c)) {
        return Err(Error::InvalidModelName(
            "Model repository string contains illegal characters",
        ));
    }

    let (repo_id, revision) = match repo_string.split_once(':') {
        Some((repo_id, "")) => (repo_id, "main"),
        Some((repo_id, revision)) => (repo_id, revision),
        None => (repo_string, "main"),
    };

    if repo_id.is_empty() {
        return Err(Error::InvalidModelName("Model repository id is empty"));
    }

    Ok((repo_id, revision))
}
