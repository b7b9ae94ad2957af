mod banana;
mod common;
mod model;
mod openai;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use banana::client::BananaClient;
use model::arg::Args;
use model::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let banana = BananaClient::new(
        config.http_client()?,
        config.upstream_base_url.clone(),
        config.poll.policy(),
    );
    tracing::info!(
        upstream = %config.upstream_base_url,
        poll_budget_secs = banana.poll_policy().budget().as_secs(),
        "Banana 客户端已初始化"
    );

    let app = openai::create_router(banana);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("监听 {} 失败", addr))?;

    tracing::info!("启动 OpenAI 兼容服务: http://{}", addr);
    tracing::info!("可用 API:");
    tracing::info!("  GET  /v1/models");
    tracing::info!("  POST /v1/chat/completions");

    axum::serve(listener, app).await?;

    Ok(())
}
