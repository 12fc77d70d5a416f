//! Subcommand implementations and the setup they share.

pub mod capabilities;
pub mod estimate;
pub mod generate;

use clap::Args;
use reporter_config::{ConfigError, ReporterConfig};
use reporter_context::{
    ContextAssembler, ContextStats, OutputMode, PromptSections, find_instructions_file, read_optional_file,
    render_prompt,
};
use reporter_core::{BudgetError, ReasoningEffort, Verbosity};
use reporter_engine::{CompletionRequest, PromptBudget, TokenGovernor, TokenMeter};
use std::path::{Path, PathBuf};
use tracing::info;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Exit code 2 for budget violations, 1 for everything else.
pub fn exit_code(err: &(dyn std::error::Error + 'static)) -> u8 {
    let budget = err
        .downcast_ref::<reporter_core::Error>()
        .is_some_and(reporter_core::Error::is_budget)
        || err.downcast_ref::<BudgetError>().is_some();
    if budget { 2 } else { 1 }
}

/// Inputs shared by `generate` and `estimate`.
#[derive(Debug, Clone, Args)]
pub struct PromptArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Instruction file (defaults to task.md, message.md, task.txt or message.txt in the root)
    #[arg(short, long)]
    pub message: Option<PathBuf>,

    /// Optional file describing the system as a whole
    #[arg(short = 'd', long)]
    pub system_description: Option<PathBuf>,

    /// Ask for a Markdown answer instead of a unified diff
    #[arg(long)]
    pub no_diff: bool,

    /// Override the model
    #[arg(long)]
    pub model: Option<String>,

    /// Requested output cap before budget reconciliation
    #[arg(long)]
    pub max_output_tokens: Option<usize>,

    /// Total budget for input, reasoning and output
    #[arg(long)]
    pub total_budget: Option<usize>,

    /// Ceiling for the measured input alone
    #[arg(long)]
    pub input_limit: Option<usize>,

    #[arg(long)]
    pub temperature: Option<f32>,

    /// low, medium or high
    #[arg(long)]
    pub reasoning_effort: Option<ReasoningEffort>,

    /// low, medium or high
    #[arg(long)]
    pub verbosity: Option<Verbosity>,

    /// Include glob, repeatable (replaces the configured include list)
    #[arg(long = "include")]
    pub include: Vec<String>,

    /// Exclude glob, repeatable (added to the configured exclude list)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Truncate each file after this many lines (0 = no limit)
    #[arg(long)]
    pub max_file_lines: Option<usize>,
}

impl PromptArgs {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut ReporterConfig) {
        let request = &mut config.request;
        if let Some(model) = &self.model {
            request.model = model.clone();
        }
        if let Some(n) = self.max_output_tokens {
            request.max_output_tokens = n;
        }
        if let Some(n) = self.total_budget {
            request.total_token_budget = n;
        }
        if let Some(n) = self.input_limit {
            request.input_token_limit = n;
        }
        if let Some(t) = self.temperature {
            request.temperature = Some(t);
        }
        if let Some(effort) = self.reasoning_effort {
            request.reasoning_effort = Some(effort);
        }
        if let Some(verbosity) = self.verbosity {
            request.verbosity = Some(verbosity);
        }

        let context = &mut config.context;
        if !self.include.is_empty() {
            context.include_patterns = self.include.clone();
        }
        context.exclude_patterns.extend(self.exclude.iter().cloned());
        if let Some(n) = self.max_file_lines {
            context.max_file_lines = n;
        }
    }
}

/// Load `--config` if given, otherwise `<root>/reporter.toml`, with env overrides.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<ReporterConfig, ConfigError> {
    match explicit {
        Some(path) => {
            let mut config = ReporterConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            Ok(config)
        }
        None => ReporterConfig::load(root),
    }
}

/// The rendered prompt and everything needed to send it.
pub struct AssembledPrompt {
    pub config: ReporterConfig,
    pub mode: OutputMode,
    pub prompt: String,
    pub stats: ContextStats,
}

impl AssembledPrompt {
    pub fn completion_request(&self) -> Result<CompletionRequest, BudgetError> {
        let request = &self.config.request;
        Ok(CompletionRequest {
            model: request.model.clone(),
            instructions: self.mode.model_instructions().to_string(),
            prompt: self.prompt.clone(),
            budget: PromptBudget::new(
                request.input_token_limit,
                request.total_token_budget,
                request.max_output_tokens,
            )?,
            previous_response_id: request.previous_response_id.clone(),
            temperature: request.temperature,
            reasoning_effort: request.reasoning_effort,
            verbosity: request.verbosity,
        })
    }

    pub fn governor(&self) -> TokenGovernor {
        TokenGovernor::new(TokenMeter::from_tokenizer_file(
            self.config.request.tokenizer_path.as_deref(),
        ))
    }
}

/// Resolve config and inputs, walk the project, and render the prompt.
pub fn assemble(args: &PromptArgs, config_path: Option<&Path>) -> Result<AssembledPrompt, Box<dyn std::error::Error>> {
    let mut config = load_config(&args.root, config_path)?;
    args.apply(&mut config);
    config.validate()?;

    let instructions_path = find_instructions_file(&args.root, args.message.as_deref())?;
    let user_instructions = read_optional_file(Some(instructions_path.as_path()));
    if user_instructions.is_empty() {
        return Err(format!("Instruction file {} is empty", instructions_path.display()).into());
    }
    let system_description = read_optional_file(args.system_description.as_deref());

    let mode = OutputMode::from_no_diff(args.no_diff);
    let assembler = ContextAssembler::new(args.root.clone(), config.context.clone())?;
    let collected = assembler.collect();

    let blocks = PromptSections {
        user_instructions: &user_instructions,
        system_description: &system_description,
        file_tree: &collected.file_tree,
        files: &collected.files,
        mode,
    }
    .to_blocks();
    let prompt = render_prompt(&blocks);

    info!(
        instructions = %instructions_path.display(),
        files = collected.stats.files_included,
        chars = prompt.len(),
        mode = ?mode,
        "Assembled prompt"
    );

    Ok(AssembledPrompt {
        config,
        mode,
        prompt,
        stats: collected.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reporter_core::BudgetKind;

    fn args(root: &Path) -> PromptArgs {
        PromptArgs {
            root: root.to_path_buf(),
            message: None,
            system_description: None,
            no_diff: false,
            model: None,
            max_output_tokens: None,
            total_budget: None,
            input_limit: None,
            temperature: None,
            reasoning_effort: None,
            verbosity: None,
            include: Vec::new(),
            exclude: Vec::new(),
            max_file_lines: None,
        }
    }

    #[test]
    fn budget_errors_exit_with_two() {
        let err: Box<dyn std::error::Error> = Box::new(reporter_core::Error::Budget(BudgetError::Exceeded {
            kind: BudgetKind::Input,
            measured: 150,
            limit: 100,
        }));
        assert_eq!(exit_code(err.as_ref()), 2);

        let err: Box<dyn std::error::Error> = Box::new(BudgetError::Invalid("zero".into()));
        assert_eq!(exit_code(err.as_ref()), 2);

        let err: Box<dyn std::error::Error> = "something else".into();
        assert_eq!(exit_code(err.as_ref()), 1);
    }

    #[test]
    fn flags_override_config() {
        let mut config = ReporterConfig::default();
        let mut a = args(Path::new("."));
        a.model = Some("gpt-4o".into());
        a.input_limit = Some(500);
        a.include = vec!["src/**".into()];
        a.exclude = vec!["*.lock".into()];
        a.apply(&mut config);

        assert_eq!(config.request.model, "gpt-4o");
        assert_eq!(config.request.input_token_limit, 500);
        assert_eq!(config.context.include_patterns, vec!["src/**"]);
        assert!(config.context.exclude_patterns.contains(&"*.lock".to_string()));
        assert!(config.context.exclude_patterns.contains(&"*.diff".to_string()));
    }

    #[test]
    fn assemble_builds_prompt_from_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("task.md"), "Rename the helper").unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "pub fn helper() {}\n").unwrap();

        let assembled = assemble(&args(dir.path()), None).unwrap();
        assert!(assembled.prompt.contains("Rename the helper"));
        assert!(assembled.prompt.contains("--- begin file src/lib.rs ---"));
        assert!(assembled.prompt.contains("unified diff"));
        assert_eq!(assembled.mode, OutputMode::Diff);

        let request = assembled.completion_request().unwrap();
        assert_eq!(request.budget.input_token_limit(), assembled.config.request.input_token_limit);
    }

    #[test]
    fn missing_instructions_fail() {
        let dir = tempfile::tempdir().unwrap();
        assert!(assemble(&args(dir.path()), None).is_err());
    }

    #[test]
    fn empty_instructions_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("task.md"), "  \n").unwrap();
        let err = assemble(&args(dir.path()), None).err().unwrap();
        assert!(err.to_string().contains("is empty"));
    }
}
