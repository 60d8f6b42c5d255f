//! Elm kernel CLI - compile notebook cells with elm-make.

mod colors;
mod run;
mod serve;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use elm_kernel_core::{KernelConfig, KernelInfo};

#[derive(Parser)]
#[command(name = "elm-kernel")]
#[command(about = "Notebook kernel that compiles Elm cells and displays the result")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Compiler and project options shared by `serve` and `run`.
#[derive(Args)]
struct KernelArgs {
    /// Elm compiler executable
    #[arg(long, default_value = elm_kernel_core::config::DEFAULT_COMPILER)]
    compiler: PathBuf,

    /// Directory containing elm-package.json
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,
}

impl KernelArgs {
    fn config(&self) -> KernelConfig {
        KernelConfig::default()
            .with_compiler(&self.compiler)
            .with_project_dir(&self.project_dir)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the kernel server
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8888")]
        port: u16,

        #[command(flatten)]
        kernel: KernelArgs,
    },

    /// Execute a notebook headlessly
    Run {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,

        /// Write the executed notebook here
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        kernel: KernelArgs,
    },

    /// Print kernel info as JSON
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { host, port, kernel } => {
            serve::execute(host, port, kernel.config()).await?;
        }

        Commands::Run {
            notebook,
            output,
            kernel,
        } => {
            run::execute(&notebook, output.as_deref(), kernel.config())?;
        }

        Commands::Info => {
            println!("{}", serde_json::to_string_pretty(&KernelInfo::default())?);
        }
    }

    Ok(())
}
