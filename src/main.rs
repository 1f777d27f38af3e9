mod config;
mod error;
mod icon_cache;
mod install;
mod manifest;
mod module_builder;
mod pipeline;
mod svg_normalizer;
mod translator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{CachePolicy, GeneratorConfig, Profile, RetryPolicy};
use icon_cache::{HttpFetcher, ThreadSleeper};
use install::CommandFormatter;
use pipeline::Pipeline;
use std::path::PathBuf;
use std::time::Duration;
use translator::CommandTranslator;

#[derive(Parser)]
#[command(name = "svg2elm")]
#[command(about = "Generate Elm icon modules from the Material Icons catalogue")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download icons and regenerate every family module
    Generate {
        /// Project root (defaults to the enclosing git checkout)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Generator generation to reproduce
        #[arg(short, long, value_enum, default_value_t = Profile::Current)]
        profile: Profile,

        /// Delete the SVG cache before downloading
        #[arg(long, conflicts_with = "keep_cache")]
        purge_cache: bool,

        /// Reuse the SVG cache from previous runs
        #[arg(long)]
        keep_cache: bool,

        /// Give up on an icon after this many forced downloads (default: never)
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Seconds to wait before re-downloading a broken icon
        #[arg(long, default_value_t = 5)]
        retry_delay: u64,

        /// Markup translator executable
        #[arg(long)]
        translator: Option<PathBuf>,

        /// Elm formatter executable
        #[arg(long)]
        formatter: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            root,
            profile,
            purge_cache,
            keep_cache,
            max_attempts,
            retry_delay,
            translator,
            formatter,
            verbose,
        } => {
            init_tracing(verbose);

            let root = match root {
                Some(root) => root,
                None => {
                    let cwd = std::env::current_dir().context("Failed to read working directory")?;
                    config::resolve_project_root(&cwd)?
                }
            };

            let mut config = GeneratorConfig::for_profile(profile, root);
            if purge_cache {
                config.cache_policy = CachePolicy::PurgeEachRun;
            } else if keep_cache {
                config.cache_policy = CachePolicy::Keep;
            }
            config.retry = RetryPolicy {
                max_attempts,
                delay: Duration::from_secs(retry_delay),
            };
            if let Some(translator) = translator {
                config.translator_program = translator;
            }
            if let Some(formatter) = formatter {
                config.formatter_program = formatter;
            }

            generate(&config)?;
        }
    }

    Ok(())
}

fn generate(config: &GeneratorConfig) -> Result<()> {
    let fetcher = HttpFetcher::new()?;
    let translator = CommandTranslator::new(&config.translator_program);
    let formatter = CommandFormatter::new(&config.formatter_program, &config.paths.root);

    let stats = Pipeline::new(config, &fetcher, &translator, &formatter, &ThreadSleeper)
        .run()
        .context("Icon generation failed")?;

    for family in &stats.families {
        println!(
            "Generated: {} from {} ({} icons)",
            family.module_name, family.family, family.icons
        );
    }
    println!(
        "\nDone! {} modules, {} icons in {}ms.",
        stats.installed,
        stats.icons(),
        stats.duration_ms
    );

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
