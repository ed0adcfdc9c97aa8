use anyhow::Result;
use clap::Parser;
use colored::control as color_control;
use dbconf::cli::command_context::CommandContext;
use dbconf::cli::commands::check::{CheckCommand, CheckCommandHandler};
use dbconf::cli::commands::coerce::{CoerceCommand, CoerceCommandHandler};
use dbconf::cli::commands::parse::{ParseCommand, ParseCommandHandler};
use dbconf::cli::{Cli, Commands};
use std::env;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run_command(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// トレーシングを初期化する
///
/// --verbose 指定時は debug、それ以外は RUST_LOG（未設定なら warn）に従う。
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dbconf=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// コマンドを実行する
fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    let working_dir = env::current_dir()?;
    let config_path = CommandContext::resolve_config_path(&working_dir, cli.config.as_deref());

    match cli.command {
        Commands::Parse { url, show_password } => {
            let handler = ParseCommandHandler::new();
            let command = ParseCommand {
                url,
                show_password,
                format: cli.format,
            };
            handler.execute(&command)
        }

        Commands::Coerce { section, prefix } => {
            let handler = CoerceCommandHandler::new();
            let command = CoerceCommand {
                config_path,
                section,
                prefix,
                format: cli.format,
            };
            handler.execute(&command)
        }

        Commands::Check { section, prefix } => {
            let handler = CheckCommandHandler::new();
            let command = CheckCommand {
                config_path,
                section,
                prefix,
                format: cli.format,
            };
            handler.execute(&command)
        }
    }
}
