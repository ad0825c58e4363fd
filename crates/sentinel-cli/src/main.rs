//! Sentinel CLI
//!
//! Command-line interface and MCP server for the prompt-to-test pipeline.

mod args;
mod cli;
mod mcp;
mod renderer;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, SentinelMcpServer};
use renderer::TerminalRenderer;
use sentinel_core::{
    params::ListPrompts, HttpInference, InferenceCapability, PipelineBuilder, StaticInference,
};

/// Inference capability selected by the global flags, if any.
fn inference_from_args(args: &Args) -> Result<Option<Arc<dyn InferenceCapability>>> {
    if let Some(ref path) = args.steps_file {
        let inference = StaticInference::from_file(path)
            .with_context(|| format!("Failed to load steps file {}", path.display()))?;
        return Ok(Some(Arc::new(inference)));
    }

    Ok(args.inference_url.as_ref().map(|url| {
        let mut inference = HttpInference::new(url.clone());
        if let Some(ref key) = args.inference_api_key {
            inference = inference.with_api_key(key.clone());
        }
        Arc::new(inference) as Arc<dyn InferenceCapability>
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut builder = PipelineBuilder::new()
        .with_database_path(args.database_file.as_ref())
        .with_inference_timeout(Duration::from_secs(args.inference_timeout));
    if let Some(inference) = inference_from_args(&args)? {
        builder = builder.with_inference(inference);
    }
    let pipeline = builder
        .build()
        .await
        .context("Failed to initialize pipeline")?;

    let renderer = TerminalRenderer::new(!args.no_color);

    info!("Sentinel started");

    let cli = Cli::new(pipeline, renderer);
    match args.command {
        Some(Commands::Prompt { command }) => cli.handle_prompt_command(command).await,
        Some(Commands::Env { command }) => cli.handle_env_command(command).await,
        Some(Commands::Suite { command }) => cli.handle_suite_command(command).await,
        Some(Commands::Result { command }) => cli.handle_result_command(command).await,
        Some(Commands::Serve) => {
            info!("Starting Sentinel MCP server");
            run_stdio_server(SentinelMcpServer::new(cli.into_pipeline()))
                .await
                .context("MCP server failed")
        }
        None => cli.list_prompts(&ListPrompts::default()).await,
    }
}
