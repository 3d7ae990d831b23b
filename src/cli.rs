//! CLI driver over the orchestrator.
//!
//! Thin by design: the CLI validates arguments, wires up the engines, and
//! polls the same operations an API layer would call.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use contentforge::config::AppConfig;
use contentforge::extraction::{ContentExtractor, ExtractionConfig};
use contentforge::generation::{GenerationEngine, GenerationEngineConfig, ProviderRegistry};
use contentforge::models::{ContentType, ItemStatus, JobSettings, ProviderChoice};
use contentforge::repository::InMemoryJobRepository;
use contentforge::workflow::{BatchWorkflow, WorkflowConfig};

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Batch content rewriting pipeline")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch: crawl the URLs, then generate draft content
    Run {
        /// Project identifier
        #[arg(long, default_value = "default")]
        project: String,
        /// Source URLs
        urls: Vec<String>,
        /// File with one URL per line (alternative to positional URLs)
        #[arg(long)]
        urls_file: Option<PathBuf>,
        /// Content type: blog_post, social_post, product_description,
        /// newsletter_section
        #[arg(long, default_value = "blog_post")]
        content_type: String,
        /// Target audience
        #[arg(long, default_value = "general readers")]
        audience: String,
        /// Comma-separated keywords to weave in
        #[arg(long)]
        keywords: Option<String>,
        /// Provider: auto, openai, anthropic, ollama
        #[arg(long, default_value = "auto")]
        provider: String,
    },

    /// Extract a single URL and print the result (debugging aid)
    Extract {
        url: String,
    },

    /// Report configured providers and extractor readiness
    Health,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::from_env(),
    };

    match cli.command {
        Commands::Run {
            project,
            urls,
            urls_file,
            content_type,
            audience,
            keywords,
            provider,
        } => {
            let mut all_urls = urls;
            if let Some(path) = urls_file {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                all_urls.extend(raw.lines().map(|l| l.to_string()));
            }

            let content_type = ContentType::from_str(&content_type)
                .with_context(|| format!("unknown content type: {}", content_type))?;
            let provider = ProviderChoice::from_str(&provider)
                .with_context(|| format!("unknown provider: {}", provider))?;

            let settings = JobSettings {
                content_type,
                audience,
                keywords: keywords
                    .map(|k| k.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
                preferred_provider: provider,
                ..Default::default()
            };

            run_batch(&config, &project, all_urls, settings).await
        }
        Commands::Extract { url } => extract_one(&config, &url).await,
        Commands::Health => health(&config).await,
    }
}

fn build_workflow(config: &AppConfig) -> BatchWorkflow {
    let extractor = ContentExtractor::new(ExtractionConfig {
        min_body_chars: config.crawl.min_body_chars,
        timeout: std::time::Duration::from_secs(config.crawl.page_timeout_secs),
        settle_delay: std::time::Duration::from_millis(config.crawl.settle_delay_ms),
        disable_browser: config.crawl.disable_browser,
    });

    let registry = Arc::new(ProviderRegistry::from_config(&config.providers));
    let engine = GenerationEngine::new(
        registry,
        GenerationEngineConfig {
            complexity_threshold: config.generation.complexity_threshold,
            max_tokens: config.generation.max_tokens,
            temperature: config.generation.temperature,
        },
    );

    BatchWorkflow::new(
        Arc::new(InMemoryJobRepository::new()),
        Arc::new(extractor),
        Arc::new(engine),
        WorkflowConfig {
            crawl_group_size: config.crawl.group_size,
            crawl_group_delay: std::time::Duration::from_secs(config.crawl.group_delay_secs),
            generation_group_size: config.generation.group_size,
            generation_group_delay: std::time::Duration::from_secs(
                config.generation.group_delay_secs,
            ),
            ..Default::default()
        },
    )
}

async fn run_batch(
    config: &AppConfig,
    project: &str,
    urls: Vec<String>,
    settings: JobSettings,
) -> anyhow::Result<()> {
    let workflow = build_workflow(config);

    let job = workflow.create_batch_job(project, urls, settings).await?;
    println!(
        "Created job {} with {} item(s)",
        style(&job.id).cyan(),
        job.items.len()
    );

    workflow.start_crawling(&job.id).await?;
    let summary = workflow.get_batch_job_status(&job.id).await?;
    println!(
        "Crawl finished: {} crawled, {} failed",
        style(summary.progress.crawled).green(),
        style(summary.progress.failed).red()
    );

    if summary.progress.crawled > 0 {
        workflow.generate_content(&job.id).await?;
    }

    let job = workflow.get_batch_job(&job.id).await?;
    println!();
    for item in &job.items {
        let status = match item.status {
            ItemStatus::Generated => style(item.status.as_str()).green(),
            ItemStatus::Failed => style(item.status.as_str()).red(),
            _ => style(item.status.as_str()).dim(),
        };
        println!("  [{}] {}", status, item.source_url);
        if let Some(ref generated) = item.generated {
            println!(
                "      \"{}\" ({} words, seo {}, via {})",
                generated.title,
                generated.metadata.word_count,
                generated.metadata.seo_score,
                generated.metadata.provider
            );
        }
        if let Some(ref error) = item.error_message {
            println!("      {}", style(error).red());
        }
    }
    println!(
        "\n{} draft(s) ready for review",
        style(job.progress.generated).green()
    );

    Ok(())
}

async fn extract_one(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    use contentforge::extraction::ArticleExtractor;

    let extractor = ContentExtractor::new(ExtractionConfig {
        min_body_chars: config.crawl.min_body_chars,
        timeout: std::time::Duration::from_secs(config.crawl.page_timeout_secs),
        settle_delay: std::time::Duration::from_millis(config.crawl.settle_delay_ms),
        disable_browser: config.crawl.disable_browser,
    });

    let content = extractor.extract(url).await;
    println!("{}", style(&content.title).bold());
    println!(
        "strategy={} quality={} language={} words={}",
        content.strategy.as_str(),
        content.quality_score,
        content.metadata.language,
        content.metadata.word_count
    );
    if !content.metadata.image_urls.is_empty() {
        println!("images: {}", content.metadata.image_urls.join(", "));
    }
    println!("\n{}", content.body);
    Ok(())
}

async fn health(config: &AppConfig) -> anyhow::Result<()> {
    let workflow = build_workflow(config);
    let report = workflow.health_check().await;

    if report.providers.is_empty() {
        println!("{}: no AI providers configured", style("warning").yellow());
    } else {
        println!("providers: {}", report.providers.join(", "));
    }
    println!(
        "browser strategy: {}",
        if report.browser_compiled {
            "compiled"
        } else {
            "not compiled"
        }
    );
    Ok(())
}
