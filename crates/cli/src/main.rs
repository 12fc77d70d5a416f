//! reporter CLI: the main entry point.
//!
//! Commands:
//! - `generate`: Assemble the project context, send it, save the answer
//!   (`--no-call` stops after writing the prompt file)
//! - `estimate`: Measure the prompt against the token limits, send nothing
//! - `capabilities`: Show which optional parameters a model accepts
//!
//! Exit codes: 0 on success, 2 when the context does not fit the token
//! limits, 1 for any other failure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "reporter",
    about = "reporter: send a project's context to a completion model and save the answer",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "REPORTER_LOGLEVEL", default_value = "info")]
    log_level: String,

    /// Config file (defaults to <root>/reporter.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the project context, send it and save the answer
    Generate(commands::generate::GenerateArgs),

    /// Measure the prompt against the token limits without calling the API
    Estimate(commands::estimate::EstimateArgs),

    /// Show which optional request parameters a model accepts
    Capabilities {
        /// Model identifier, e.g. gpt-5 or openai/gpt-4o
        model: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(args, config_path).await,
        Commands::Estimate(args) => commands::estimate::run(args, config_path),
        Commands::Capabilities { model, json } => commands::capabilities::run(&model, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(commands::exit_code(e.as_ref()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_overrides() {
        let cli = Cli::try_parse_from([
            "reporter",
            "generate",
            "proj",
            "--model",
            "gpt-4o",
            "--no-diff",
            "--reasoning-effort",
            "medium",
            "--exclude",
            "*.lock",
            "--exclude",
            "vendor/**",
            "--previous-response-id",
            "resp_1",
        ])
        .unwrap();

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.prompt.root, PathBuf::from("proj"));
        assert_eq!(args.prompt.model.as_deref(), Some("gpt-4o"));
        assert!(args.prompt.no_diff);
        assert_eq!(args.prompt.reasoning_effort, Some(reporter_core::ReasoningEffort::Medium));
        assert_eq!(args.prompt.exclude, vec!["*.lock", "vendor/**"]);
        assert_eq!(args.previous_response_id.as_deref(), Some("resp_1"));
    }

    #[test]
    fn parses_prompt_only_generate() {
        let cli = Cli::try_parse_from(["reporter", "generate", "--no-call", "-o", "out/step.md"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(args.no_call);
        assert_eq!(args.output, Some(PathBuf::from("out/step.md")));
    }

    #[test]
    fn root_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["reporter", "estimate"]).unwrap();
        let Commands::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.prompt.root, PathBuf::from("."));
        assert!(!args.json);
    }

    #[test]
    fn invalid_effort_is_rejected() {
        assert!(Cli::try_parse_from(["reporter", "generate", "--reasoning-effort", "extreme"]).is_err());
    }

    #[test]
    fn capabilities_takes_a_model() {
        let cli = Cli::try_parse_from(["reporter", "capabilities", "o3-mini", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Capabilities { ref model, json: true } if model == "o3-mini"));
    }
}
