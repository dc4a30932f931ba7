//! Sitesmith CLI - Command line interface for the sitesmith agent tools
//!
//! Runs git and file tool calls against a single working tree and prints the
//! response records as JSON on stdout. Logs go to stderr.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sitesmith_core::{
    Config, FileWriter, GitTool, GitToolConfig, Secrets, ToolResponse, ToolResult, Toolbox,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{GitArgs, WriteArgs};

/// Sitesmith: git and file tools for content-generating agents
#[derive(Parser, Debug)]
#[command(name = "sitesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Working tree to operate on (overrides config and GIT_REPO_PATH)
    #[arg(long, global = true)]
    repo_path: Option<PathBuf>,

    /// Ignore the config file, secrets and environment variables
    #[arg(long, global = true)]
    no_env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run a git operation
    #[command(visible_alias = "g")]
    Git(GitArgs),

    /// Write generated content into the output directory
    #[command(visible_alias = "w")]
    Write(WriteArgs),

    /// Read JSON tool calls from stdin, one per line
    Session,

    /// Show current configuration
    Config {
        /// Write an empty secrets file for the GitHub token
        #[arg(long)]
        init_secrets: bool,
    },
}

fn build_toolbox(config: &Config, secrets: &Secrets, use_env: bool) -> ToolResult<Toolbox> {
    let mut tool_config = GitToolConfig::from_sources(config, secrets);
    if !use_env {
        tool_config.credential = None;
    }

    let git = GitTool::new(tool_config)?;
    Ok(Toolbox::new(git, FileWriter::new(&config.output.dir)))
}

/// The toolbox, or the construction failure rendered as a response record
fn toolbox_or_record(built: ToolResult<Toolbox>) -> Result<Toolbox, serde_json::Value> {
    built.map_err(|err| ToolResponse::<()>::from(Err(err)).to_json())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let use_env = !cli.no_env;
    let config = Config::load_with_overrides(cli.repo_path.clone(), use_env)?;
    let secrets = if use_env {
        Secrets::load()?
    } else {
        Secrets::default()
    };

    if cli.verbose {
        tracing::info!(
            repo_path = ?config.git.repo_path,
            default_branch = %config.git.default_branch,
            output_dir = %config.output.dir.display(),
            "Configuration loaded"
        );
    }

    let success = match cli.command {
        Some(Commands::Version) => {
            println!("sitesmith {}", env!("CARGO_PKG_VERSION"));
            true
        }
        Some(Commands::Git(args)) => {
            match toolbox_or_record(build_toolbox(&config, &secrets, use_env)) {
                Ok(mut toolbox) => args.execute(&mut toolbox)?,
                Err(record) => commands::print_record(&record)?,
            }
        }
        Some(Commands::Write(args)) => {
            match toolbox_or_record(build_toolbox(&config, &secrets, use_env)) {
                Ok(mut toolbox) => args.execute(&mut toolbox)?,
                Err(record) => commands::print_record(&record)?,
            }
        }
        Some(Commands::Session) => {
            match toolbox_or_record(build_toolbox(&config, &secrets, use_env)) {
                Ok(mut toolbox) => commands::session::run(&mut toolbox)?,
                Err(record) => commands::print_record(&record)?,
            }
        }
        Some(Commands::Config { init_secrets }) => {
            if init_secrets {
                let path = Secrets::create_template()?;
                println!("Created {}", path.display());
            }
            commands::config::show(&config, &secrets, use_env);
            true
        }
        None => {
            println!("Sitesmith - git and file tools for content-generating agents");
            println!();
            println!("Use --help for usage information");
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
