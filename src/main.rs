mod analysis;
mod api;
mod app;
mod categories;
mod commands;
mod config;
mod controller;
mod errors;
mod history;
mod output;
mod parse;
mod provider;
mod report;
mod tui;

use clap::{Parser, Subcommand};

use crate::app::Runtime;
use crate::commands::analyze::AnalyzeArgs;
use crate::commands::config::ConfigCommand;
use crate::commands::tui::TuiArgs;
use crate::errors::CliError;
use crate::output::{OutputMode, init_tracing, print_error};

#[derive(Debug, Parser)]
#[command(
    name = "bizlens",
    version,
    about = "Business-idea feasibility analysis for the Mongolian market, powered by Gemini."
)]
struct Cli {
    #[arg(long, global = true)]
    profile: Option<String>,
    #[arg(long = "api-url", global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    model: Option<String>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, global = true)]
    quiet: bool,
    /// Request timeout in milliseconds; unset waits indefinitely
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[arg(long, global = true)]
    verbose: bool,
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one idea and print the report
    Analyze(AnalyzeArgs),
    /// Interactive analyzer with history
    Tui(TuiArgs),
    /// List the sector categories
    Categories,
    /// Print the response schema sent with every request
    Schema,
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = OutputMode {
        json: cli.json,
        quiet: cli.quiet,
        verbose: cli.verbose,
        debug: cli.debug,
    };

    let log_file = match cli.command {
        Commands::Tui(_) => config::tui_log_path(),
        _ => None,
    };
    if let Err(err) = init_tracing(&output, log_file.as_deref()) {
        output.print_stderr(&format!("warning: {err}"));
    }

    let result = run(cli, output.clone()).await;
    if let Err(err) = result {
        tracing::debug!(code = err.exit_code(), "command failed");
        print_error(&err, &output);
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli, output: OutputMode) -> Result<(), CliError> {
    let config = config::load_config()?;
    let config_path = config::config_path()?;

    let mut runtime = Runtime {
        output,
        config,
        config_path,
        profile_override: cli.profile,
        api_url_override: cli.api_url,
        model_override: cli.model,
        timeout_ms: cli.timeout,
    };

    match cli.command {
        Commands::Analyze(args) => commands::analyze::handle(&runtime, args).await,
        Commands::Tui(args) => commands::tui::handle(&runtime, args).await,
        Commands::Categories => commands::categories::handle(&runtime).await,
        Commands::Schema => commands::categories::handle_schema(&runtime).await,
        Commands::Config { command } => commands::config::handle(&mut runtime, command).await,
    }
}
