//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod classify;
mod documents;
mod helpers;
mod init;
mod process;
mod report;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};
use crate::models::Domain;

/// Output format for `ls`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ListFormat {
    #[default]
    Table,
    Json,
    /// Just ids, one per line (for piping)
    Ids,
}

/// Output format for `report`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "docshelf")]
#[command(about = "Document intake: OCR, domain tagging and AI summaries")]
#[command(version)]
pub struct Cli {
    /// Data directory (overrides config file)
    #[arg(long, short = 'd', global = true, env = "DOCSHELF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
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
    /// Initialize the data directory and registry
    Init,

    /// Process files: OCR, classify, analyze and register
    Process {
        /// PDF or image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List registered documents
    Ls {
        /// Only show one domain
        #[arg(long, short = 'D')]
        domain: Option<Domain>,
        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: ListFormat,
    },

    /// Show a document's metadata, summary and analysis
    Show {
        /// Document id (or unique prefix)
        id: String,
        /// Also print the extracted text
        #[arg(long)]
        text: bool,
    },

    /// Remove a document from the registry
    Rm {
        /// Document id (or unique prefix)
        id: String,
        /// Keep the stored upload on disk
        #[arg(long)]
        keep_file: bool,
    },

    /// Counts per domain and per day
    Report {
        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: ReportFormat,
    },

    /// Classify plain text without storing anything
    Classify {
        /// Text file, or - for stdin
        input: String,
    },

    /// Check external tools, credentials and registry health
    Check,

    /// Start the web server
    Serve {
        /// Address to bind: port, host, or host:port
        #[arg(default_value = "127.0.0.1:3030")]
        bind: String,
    },
}

/// Parse CLI arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings, &config).await,
        Commands::Process { files } => process::cmd_process(&settings, &config, &files).await,
        Commands::Ls { domain, format } => documents::cmd_ls(&settings, domain, format),
        Commands::Show { id, text } => documents::cmd_show(&settings, &id, text),
        Commands::Rm { id, keep_file } => documents::cmd_rm(&settings, &id, keep_file),
        Commands::Report { format } => report::cmd_report(&settings, format),
        Commands::Classify { input } => classify::cmd_classify(&config, &input),
        Commands::Check => check::cmd_check(&settings, &config),
        Commands::Serve { bind } => serve::cmd_serve(&settings, &config, &bind).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ls_with_domain() {
        let cli = Cli::try_parse_from(["docshelf", "ls", "--domain", "legal", "-f", "ids"]).unwrap();
        match cli.command {
            Commands::Ls { domain, format } => {
                assert_eq!(domain, Some(Domain::Legal));
                assert_eq!(format, ListFormat::Ids);
            }
            _ => panic!("expected ls"),
        }
    }

    #[test]
    fn test_process_requires_files() {
        assert!(Cli::try_parse_from(["docshelf", "process"]).is_err());
    }

    #[test]
    fn test_serve_default_bind() {
        let cli = Cli::try_parse_from(["docshelf", "--data-dir", "/tmp/x", "serve"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind, "127.0.0.1:3030"),
            _ => panic!("expected serve"),
        }
    }
}
