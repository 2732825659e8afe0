use anyhow::Result;
use clap::Parser;
use std::net::IpAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentsim::device::print_device_info;

mod server;
use server::state::ServerState;
use server::utils::{self, port_in_range};
use server::{init_router, ModelArgs};

/// Sentence similarity server.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct App {
    #[clap(flatten)]
    pub model_args: ModelArgs,

    #[arg(value_parser = port_in_range)]
    #[clap(short, long, default_value = "3000")]
    pub port: u16,

    #[clap(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Don't load the model at startup; the first request loads it
    #[clap(long)]
    pub lazy: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<ExitCode> {
    let args = App::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                "sentsim=debug,sentsim_server=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_device_info();

    let state = Arc::new(ServerState::from_args(&args.model_args));
    let router = init_router(state.clone());

    let listener = TcpListener::bind((args.host, args.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    if !args.lazy {
        let provider = state.provider.clone();
        tokio::spawn(async move {
            if let Err(err) = provider.ensure_loaded().await {
                tracing::error!("Model preload failed, retrying on first request: {err}");
            }
        });
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await?;

    Ok(ExitCode::SUCCESS)
}
