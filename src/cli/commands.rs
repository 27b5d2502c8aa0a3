//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use crate::core::config::TranslatorConfig;
use crate::core::models::TranslatableColumns;
use crate::pipeline::orchestrator::WorkbookTranslator;
use crate::processors::export::{clipboard_text, export_results, ExportFormat};
use crate::processors::workbook::read_workbook;

/// Commands for Assessment Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a spreadsheet into one or more languages
    Translate {
        /// Input file (.xlsx, .xls, .ods or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// Target language codes, comma separated (e.g. hi,bn)
        #[arg(short, long, value_delimiter = ',', required = true)]
        lang: Vec<String>,

        /// Only translate these columns (comma separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "assessment_columns")]
        columns: Option<Vec<String>>,

        /// Only translate the standard assessment columns
        #[arg(long)]
        assessment_columns: bool,

        /// Output format: xlsx or csv
        #[arg(long, default_value = "xlsx")]
        format: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print results as text instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// List languages supported by the configured provider
    Languages,

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// Resolve the column allow-list from CLI flags
pub fn allow_list(columns: Option<Vec<String>>, assessment_columns: bool) -> Option<TranslatableColumns> {
    if assessment_columns {
        Some(TranslatableColumns::assessment())
    } else {
        columns.map(TranslatableColumns::new)
    }
}

/// Handle workbook translation command
#[allow(clippy::too_many_arguments)]
pub async fn handle_translate(
    config: TranslatorConfig,
    file: PathBuf,
    lang: Vec<String>,
    columns: Option<Vec<String>>,
    assessment_columns: bool,
    format: String,
    output: Option<PathBuf>,
    stdout: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let format: ExportFormat = format.parse()?;
    let output = output.unwrap_or_else(|| PathBuf::from("."));
    let columns = allow_list(columns, assessment_columns);

    info!("Starting workbook translation");
    info!("Input: {}", file.display());
    info!("Provider: {}", config.provider);
    info!("Target languages: {}", lang.join(", "));
    if let Some(ref cols) = columns {
        info!("Translatable columns: {}", cols.len());
    }

    let workbook = read_workbook(&file)?;
    let translator = WorkbookTranslator::from_config(&config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!(
        "Translating {} rows into {} languages",
        workbook.total_rows(),
        lang.len()
    ));

    let results = translator
        .translate_workbook(&workbook, &lang, columns.as_ref())
        .await;
    let results = match results {
        Ok(results) => {
            pb.finish_with_message("Completed");
            results
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };

    if stdout {
        for result in results.values() {
            println!("##### {} ({})", result.language_name(), result.target_lang);
            print!("{}", clipboard_text(result)?);
        }
    } else {
        let written = export_results(&results, &output, format)?;
        for path in &written {
            println!("   Wrote: {}", path.display());
        }
    }

    let duration = start_time.elapsed();
    info!("Translation finished in {:?}", duration);

    println!("\n✅ Translation completed!");
    println!("   Sheets: {}", workbook.sheets.len());
    println!("   Languages: {}", results.len());
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Handle languages command
pub async fn handle_languages(config: TranslatorConfig) -> anyhow::Result<()> {
    println!("Languages supported by {}:", config.provider);
    for language in config.provider.languages() {
        println!("  {:<4} {:<12} {}", language.code, language.name, language.native);
    }
    if !config.has_credentials() {
        println!("\n⚠️  No credentials configured: translations will be demo placeholders.");
    }
    Ok(())
}

/// Handle server command
pub async fn handle_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    info!("Starting HTTP API server on {}:{}", host, port);

    run_server(host, port, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_parse_translate() {
        let cli = TestCli::parse_from([
            "test", "translate", "--file", "quiz.xlsx", "--lang", "hi,bn", "--columns", "question,notes",
        ]);
        match cli.command {
            Commands::Translate { lang, columns, format, .. } => {
                assert_eq!(lang, vec!["hi", "bn"]);
                assert_eq!(columns, Some(vec!["question".to_string(), "notes".to_string()]));
                assert_eq!(format, "xlsx");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_columns_conflict_with_preset() {
        let parsed = TestCli::try_parse_from([
            "test", "translate", "-f", "quiz.csv", "-l", "hi", "--columns", "q", "--assessment-columns",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_allow_list() {
        assert_eq!(allow_list(None, false), None);
        assert_eq!(allow_list(None, true), Some(TranslatableColumns::assessment()));
        assert!(allow_list(Some(vec!["Question".into()]), false)
            .unwrap()
            .allows("question"));
    }

    #[tokio::test]
    async fn test_translate_in_demo_mode_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("quiz.csv");
        std::fs::write(&input, "question,marks\nWhat is a cat?,2\n").unwrap();
        let out = dir.path().join("out");

        let result = handle_translate(
            TranslatorConfig::default(),
            input,
            vec!["hi".to_string()],
            None,
            true,
            "csv".to_string(),
            Some(out.clone()),
            false,
        )
        .await;
        tokio_test::assert_ok!(result);

        let written = std::fs::read_to_string(out.join("assessment_hi.csv")).unwrap();
        assert_eq!(written, "question,marks\n[HI] What is a cat?,2\n");
    }
}
