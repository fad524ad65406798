use anyhow::Result;
use hostsnap::config::{AppConfig, OutputFormat};
use hostsnap::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so the report on stdout stays clean.
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = AppConfig::load()?;
    tracing::info!(
        version = %version::banner(),
        cpu_interval_ms = app_config.sampling.cpu_interval_ms,
        concurrent = app_config.collection.concurrent,
        "starting"
    );

    let collector = std::sync::Arc::new(Collector::with_config(SysinfoRepo::new(), &app_config));
    let snapshot = if app_config.collection.concurrent {
        collector.collect_concurrent().await?
    } else {
        let c = collector.clone();
        tokio::task::spawn_blocking(move || c.collect())
            .await
            .map_err(|e| anyhow::anyhow!("collector task join: {}", e))??
    };

    match app_config.output.format {
        OutputFormat::Text => print!("{}", report::render_text(&snapshot)),
        OutputFormat::Json if app_config.output.pretty => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?)
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&snapshot)?),
    }

    Ok(())
}
