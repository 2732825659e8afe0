use sentsim::{Embed, SentenceEncoder};
use std::sync::Arc;

use crate::server::init::ModelArgs;
use crate::server::provider::ModelProvider;

/// Represents the state of the server.
#[derive(Clone)]
pub struct ServerState {
    pub provider: ModelProvider,
}

impl ServerState {
    pub fn new(provider: ModelProvider) -> Self {
        Self { provider }
    }

    /// State whose provider loads a [`SentenceEncoder`] described by `args`.
    pub fn from_args(args: &ModelArgs) -> Self {
        let args = args.clone();

        let provider = ModelProvider::new(move || {
            let builder = SentenceEncoder::builder().with_pooling_strategy(args.pooling);
            let builder = match &args.model_folder {
                Some(folder) => {
                    tracing::info!("Loading model from {}. Wait for model load.", folder.display());
                    builder.with_model_folder(folder)
                }
                None => {
                    tracing::info!("Loading model {}. Wait for model load.", args.model_repo);
                    builder.with_model_repo(&args.model_repo)?
                }
            };

            Ok(Arc::new(builder.build()?) as Arc<dyn Embed>)
        });

        Self::new(provider)
    }
}
