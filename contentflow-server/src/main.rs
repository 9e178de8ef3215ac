//! `contentflow` command-line entry point.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use contentflow::config::{JobStoreBackend, Settings};
use contentflow::events::{LoggingSink, ProgressNotifier};
use contentflow::jobs::{FileJobStore, InMemoryJobStore, JobManager, JobStore};
use contentflow::llm::OpenAiProvider;
use contentflow::observability::init_tracing;
use contentflow::output::save_content;
use contentflow::pipeline::{ContentPipeline, PipelineOptions};
use contentflow_server::{build_router, AppState, ServerMode};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "contentflow")]
#[command(about = "Generate SEO-ready articles with a six-stage LLM pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (defaults to PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Transport surface to expose
        #[arg(short, long, value_enum, default_value_t = ServerMode::Live)]
        mode: ServerMode,
    },
    /// Generate one article
    Generate {
        /// Topic to write about
        topic: String,

        /// Write the article to the output directory instead of stdout
        #[arg(long)]
        save: bool,

        /// Skip the HTML publisher
        #[arg(long)]
        no_html: bool,
    },
    /// Generate one article per topic, in order
    Batch {
        /// Topics to write about
        #[arg(required = true)]
        topics: Vec<String>,

        /// Pause between topics (defaults to BATCH_DELAY_MS)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Write each article to the output directory
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env().context("Failed to load configuration")?;
    init_tracing(settings.log_format);

    let provider = Arc::new(OpenAiProvider::new(&settings.provider).context("Failed to create provider")?);

    match cli.command {
        Command::Serve { port, mode } => {
            let pipeline = Arc::new(ContentPipeline::from_settings(provider, &settings));
            serve(&settings, pipeline, port.unwrap_or(settings.port), mode).await
        }
        Command::Generate { topic, save, no_html } => {
            let options = PipelineOptions::from_settings(&settings).with_html(!no_html && settings.generate_html);
            let pipeline = ContentPipeline::new(provider, options);
            let notifier = ProgressNotifier::with_sink(Arc::new(LoggingSink::default()));

            let result = pipeline.run(&topic, &notifier).await?;
            if save {
                let saved = save_content(&settings.output_dir, &result).await?;
                println!("{}", saved.markdown.display());
                if let Some(html) = saved.html {
                    println!("{}", html.display());
                }
            } else {
                println!("{}", result.markdown.content);
            }
            Ok(())
        }
        Command::Batch { topics, delay_ms, save } => {
            let pipeline = ContentPipeline::from_settings(provider, &settings);
            let notifier = ProgressNotifier::with_sink(Arc::new(LoggingSink::default()));
            let delay = delay_ms.map_or_else(|| settings.batch_delay(), Duration::from_millis);

            let outcome = pipeline.run_batch(topics.as_slice(), delay, &notifier).await;

            for (topic, result) in topics.iter().zip(&outcome.results) {
                match result {
                    Some(result) if save => {
                        let saved = save_content(&settings.output_dir, result).await?;
                        println!("ok      {topic} -> {}", saved.markdown.display());
                    }
                    Some(_) => println!("ok      {topic}"),
                    None => println!("failed  {topic}"),
                }
            }
            for failure in &outcome.failures {
                warn!(topic = %failure.topic, error = %failure.error, "Topic failed");
            }

            if !outcome.all_succeeded() {
                bail!("{} of {} topics failed", outcome.failures.len(), topics.len());
            }
            Ok(())
        }
    }
}

async fn serve(settings: &Settings, pipeline: Arc<ContentPipeline>, port: u16, mode: ServerMode) -> anyhow::Result<()> {
    let store = job_store(&settings.job_store).await?;
    let jobs = Arc::new(JobManager::new(store));
    let state = Arc::new(AppState::new(pipeline, Arc::clone(&jobs)).with_output_dir(settings.output_dir.clone()));

    let app = build_router(state, mode);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, %mode, store = jobs.store().name(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let drained = jobs.drain().await;
    info!(drained, "Server stopped");
    Ok(())
}

async fn job_store(backend: &JobStoreBackend) -> anyhow::Result<Arc<dyn JobStore>> {
    let store: Arc<dyn JobStore> = match backend {
        JobStoreBackend::Memory => Arc::new(InMemoryJobStore::new()),
        JobStoreBackend::File { dir } => Arc::new(
            FileJobStore::open(dir.clone())
                .await
                .with_context(|| format!("Failed to open job directory {}", dir.display()))?,
        ),
        #[cfg(feature = "s3")]
        JobStoreBackend::S3 { bucket } => Arc::new(contentflow::jobs::S3JobStore::from_env(bucket.clone()).await),
        #[cfg(not(feature = "s3"))]
        JobStoreBackend::S3 { .. } => bail!("JOB_STORE=s3 requires the `s3` feature"),
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }
}
