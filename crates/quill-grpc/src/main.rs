//! Quill gRPC Server
//!
//! Loads configuration, builds the completion client, and serves
//! `Greeter/GetAnswer` until interrupted.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use quill::{Answerer, Config, OpenAiClient};
use quill_grpc::AnswerServer;

/// Quill gRPC Server - Shakespearean rewrites over gRPC
#[derive(Parser, Debug)]
#[command(name = "quill-grpc")]
#[command(about = "gRPC server that rewrites questions in the voice of Shakespeare")]
struct Args {
    /// The server port
    #[arg(long, default_value_t = 50051)]
    port: u16,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing on stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    // Configuration must be valid before any socket is opened
    let config = Config::load().inspect_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
    })?;

    let client = OpenAiClient::new(&config).inspect_err(|e| {
        tracing::error!("Failed to build completion client: {}", e);
    })?;
    tracing::info!(model = client.model(), timeout = ?config.timeout, "Completion client ready");

    let addr = SocketAddr::new(args.host, args.port);
    let listener = quill_grpc::bind(addr).await.inspect_err(|e| {
        tracing::error!("{}", e);
    })?;

    AnswerServer::new(Answerer::new(Arc::new(client)))
        .serve(listener)
        .await
        .inspect_err(|e| {
            tracing::error!("{}", e);
        })?;

    Ok(())
}
