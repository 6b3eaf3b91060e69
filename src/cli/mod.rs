//! Command-line interface for feedkit.
//!
//! Provides commands for converting the article folder to the feed JSON,
//! asking the chat provider, generating titles and inspecting configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::adapters::GroqClient;
use crate::chat::{ChatService, ChatTurn};
use crate::config::{self, ResolvedConfig};
use crate::core::{ConvertReport, Converter};

/// feedkit - article text to feed JSON converter
#[derive(Parser, Debug)]
#[command(name = "feedkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert article text files into the feed JSON
    Convert {
        /// Directory of article .txt files
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Raw image tree
        #[arg(long)]
        images: Option<PathBuf>,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Published images directory (cleared on each run)
        #[arg(long)]
        images_out: Option<PathBuf>,

        /// Seed for the random image fallback
        #[arg(long)]
        seed: Option<u64>,

        /// Use the placeholder image instead of failing when no images exist
        #[arg(long)]
        allow_missing_images: bool,
    },

    /// Ask the chat provider a question
    Ask {
        /// Message to send
        #[arg(conflicts_with = "history", required_unless_present = "history")]
        message: Option<String>,

        /// JSON file with a conversation: [{"role": "user", "content": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Generate a short title for a text
    Title {
        /// Source text
        text: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Convert {
                input,
                images,
                output,
                images_out,
                seed,
                allow_missing_images,
            } => {
                let overrides = PathOverrides {
                    input,
                    images,
                    output,
                    images_out,
                };
                convert(overrides, seed, allow_missing_images)
            }
            Commands::Ask { message, history } => ask(message, history).await,
            Commands::Title { text } => title(&text).await,
            Commands::Config => show_config(),
        }
    }
}

/// Command-line path overrides, relative to the working directory
struct PathOverrides {
    input: Option<PathBuf>,
    images: Option<PathBuf>,
    output: Option<PathBuf>,
    images_out: Option<PathBuf>,
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Convert the article folder
fn convert(overrides: PathOverrides, seed: Option<u64>, allow_missing_images: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let mut options = cfg.convert_options();
    if let Some(path) = overrides.input {
        options.input_dir = absolutize(&cwd, path);
    }
    if let Some(path) = overrides.images {
        options.images_dir = absolutize(&cwd, path);
    }
    if let Some(path) = overrides.output {
        options.output_file = absolutize(&cwd, path);
    }
    if let Some(path) = overrides.images_out {
        options.images_out_dir = absolutize(&cwd, path);
    }
    if allow_missing_images {
        options.require_images = false;
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = Converter::new(options).run(&mut rng)?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &ConvertReport) {
    println!(
        "\n✅ Converted {} article(s) -> {}",
        report.total(),
        report.output_file.display()
    );
    println!("   Images matched: {}/{}", report.matched, report.total());

    if !report.random_titles.is_empty() {
        println!("   Random images:");
        for title in &report.random_titles {
            println!("     - {}", title);
        }
    }
    if !report.placeholder_titles.is_empty() {
        println!("   Placeholder images:");
        for title in &report.placeholder_titles {
            println!("     - {}", title);
        }
    }
}

fn chat_service(cfg: &ResolvedConfig) -> Result<ChatService<GroqClient>> {
    let client = GroqClient::from_settings(&cfg.groq)?;
    Ok(ChatService::new(client))
}

/// Ask a single question or continue a conversation
async fn ask(message: Option<String>, history: Option<PathBuf>) -> Result<()> {
    let cfg = config::load_config()?;
    let service = chat_service(&cfg)?;

    let reply = match (message, history) {
        (_, Some(path)) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read history file: {}", path.display()))?;
            let turns: Vec<ChatTurn> = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid history file: {}", path.display()))?;
            service.ask_history(&turns).await?
        }
        (Some(message), None) => service.ask(&message).await?,
        (None, None) => anyhow::bail!("Provide a message or --history"),
    };

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

/// Generate a title
async fn title(text: &str) -> Result<()> {
    let cfg = config::load_config()?;
    let service = chat_service(&cfg)?;

    let reply = service.title(text).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::load_config()?;

    println!("feedkit configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    if let Some(version) = &cfg.config_version {
        println!("Version:     {}", version);
    }
    println!("Root:        {}", cfg.root.display());
    println!();
    println!("Paths:");
    println!("  Articles:       {}", cfg.input_dir.display());
    println!("  Raw images:     {}", cfg.images_dir.display());
    println!("  Output JSON:    {}", cfg.output_file.display());
    println!("  Images out:     {}", cfg.images_out_dir.display());
    println!();
    println!("Convert:");
    println!("  Public prefix:  {}", cfg.convert.public_prefix);
    println!("  Max slug chars: {}", cfg.convert.max_slug_chars);
    println!("  Extensions:     {}", cfg.convert.extensions.join(", "));
    println!("  Require images: {}", cfg.convert.require_images);
    println!();
    println!("Groq:");
    println!("  Model:          {}", cfg.groq.model);
    println!("  Base URL:       {}", cfg.groq.base_url);
    println!(
        "  API key:        {}",
        if cfg.groq.api_key.is_some() { "(set)" } else { "(not set)" }
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert_flags() {
        let cli = Cli::try_parse_from([
            "feedkit",
            "convert",
            "--input",
            "txt",
            "--seed",
            "7",
            "--allow-missing-images",
        ])
        .unwrap();

        match cli.command {
            Commands::Convert {
                input,
                seed,
                allow_missing_images,
                output,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("txt")));
                assert_eq!(seed, Some(7));
                assert!(allow_missing_images);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_message_or_history() {
        assert!(Cli::try_parse_from(["feedkit", "ask"]).is_err());
        assert!(Cli::try_parse_from(["feedkit", "ask", "привет"]).is_ok());
        assert!(Cli::try_parse_from(["feedkit", "ask", "--history", "h.json"]).is_ok());
        assert!(Cli::try_parse_from(["feedkit", "ask", "hi", "--history", "h.json"]).is_err());
    }

    #[test]
    fn test_absolutize() {
        let cwd = Path::new("/work");
        assert_eq!(absolutize(cwd, PathBuf::from("a/b")), PathBuf::from("/work/a/b"));
        assert_eq!(absolutize(cwd, PathBuf::from("/abs")), PathBuf::from("/abs"));
    }
}
