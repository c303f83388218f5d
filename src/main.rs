use anyhow::Result;
use bankscraper::{pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) run the pipeline ─────────────────────────────────────────
    let config = PipelineConfig::default();
    info!(url = %config.source_url, db = %config.db_path.display(), "configured");
    pipeline::run(&config).await?;

    info!("all done");
    Ok(())
}
