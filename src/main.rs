//! Main entry point for Assessment Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assessment_translator::cli::commands::{self, Commands};
use assessment_translator::core::models::ProviderKind;
use assessment_translator::TranslatorConfig;

/// Assessment Translator - translate spreadsheet assessments into many languages at once
#[derive(Parser, Debug)]
#[command(name = "assessment-translator", version, about, long_about = None)]
struct Args {
    /// Translation provider: google or bhashini (defaults to TRANSLATION_PROVIDER)
    #[arg(long, global = true)]
    provider: Option<ProviderKind>,

    /// API key for the selected provider (overrides the environment)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Load configuration from a JSON file instead of the environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Delay between consecutive batches in milliseconds
    #[arg(long, global = true)]
    batch_delay_ms: Option<u64>,

    /// Per-call timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<TranslatorConfig> {
        let mut config = match &self.config {
            Some(path) => TranslatorConfig::from_file(path)?,
            None => TranslatorConfig::from_env()?,
        };

        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(ref api_key) = self.api_key {
            config.set_api_key(api_key.clone());
        }
        if let Some(delay) = self.batch_delay_ms {
            config.batch_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout_ms {
            config.timeout_ms = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}={}", env!("CARGO_CRATE_NAME"), log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Execute command
    match args.command {
        Some(Commands::Translate {
            ref file,
            ref lang,
            ref columns,
            assessment_columns,
            ref format,
            ref output,
            stdout,
        }) => {
            commands::handle_translate(
                args.load_config()?,
                file.clone(),
                lang.clone(),
                columns.clone(),
                assessment_columns,
                format.clone(),
                output.clone(),
                stdout,
            )
            .await?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages(args.load_config()?).await?;
        }
        Some(Commands::Server { ref host, port }) => {
            commands::handle_server(args.load_config()?, host.clone(), port).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
