//! `reporter generate`: Write the prompt, send it, and save the answer.
//!
//! With `--no-call` only the prompt file is written, for pasting into a chat
//! by hand. No credentials are needed in that mode.

use super::{CommandResult, PromptArgs, assemble};
use crate::output::{self, Artifacts};
use clap::Args;
use reporter_context::OutputMode;
use reporter_core::ResponseStatus;
use reporter_engine::{CompletionEngine, Pipeline, PollPolicy, prepare};
use reporter_providers::OpenAiResponsesTransport;
use reporter_telemetry::{CostEstimate, PricingTable};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Continue from an earlier response
    #[arg(long)]
    pub previous_response_id: Option<String>,

    /// Prompt file to write; the diff and response files go next to it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only write the prompt file, do not call the API
    #[arg(long)]
    pub no_call: bool,
}

pub async fn run(args: GenerateArgs, config_path: Option<&Path>) -> CommandResult {
    let artifacts = Artifacts::new(&args.prompt.root, args.output.as_deref());
    let mut assembled = assemble(&args.prompt, config_path)?;
    if let Some(id) = args.previous_response_id {
        assembled.config.request.previous_response_id = Some(id);
    }

    let prompt_path = artifacts.write_prompt(&assembled.prompt)?;
    info!(path = %prompt_path.display(), "Saved prompt");

    if args.no_call {
        println!("✅ Prompt saved to {}", prompt_path.display());
        return Ok(());
    }

    // Budget check before anything that needs credentials or the network
    let request = assembled.completion_request()?;
    let governor = assembled.governor();
    let prepared = prepare(&governor, &request)?;

    let pricing = PricingTable::with_defaults();
    let projected = CostEstimate::projected(
        &pricing,
        &request.model,
        prepared.report.measured_input_tokens as u64,
        prepared.report.bounded_max_output_tokens as u64,
    );
    info!(model = %request.model, cost = %projected, "Estimated maximum cost");

    let transport = OpenAiResponsesTransport::from_config(&assembled.config.api)?;
    let polling = &assembled.config.polling;
    let engine = CompletionEngine::new(Arc::new(transport))
        .with_policy(PollPolicy::from_secs(polling.interval_secs, polling.timeout_secs));
    let pipeline = Pipeline::new(governor, engine);

    println!("⏳ Sending request to {} …", request.model);
    let outcome = pipeline.submit(prepared).await?;
    let result = outcome.result;

    if let Some(usage) = &result.usage {
        let actual = CostEstimate::from_usage(&pricing, &request.model, usage);
        info!(cost = %actual, "Reported usage");
    }

    if result.is_empty_completion() {
        warn!(id = result.id.as_deref().unwrap_or("-"), "Model completed but returned no text");
        println!("⚠️  The model completed but returned no text; nothing was written.");
        return Ok(());
    }

    if result.status != ResponseStatus::Completed {
        warn!(status = %result.status, "Response did not complete");
        if !result.has_text() {
            return Err(format!("Response ended with status '{}' and no output", result.status).into());
        }
    }

    match assembled.mode {
        OutputMode::Diff => {
            let numbered = output::write_diff(artifacts.dir(), &result.text)?;
            println!(
                "✅ Diff saved to {} and {}",
                artifacts.dir().join(output::CURRENT_DIFF_FILE).display(),
                numbered.display()
            );
        }
        OutputMode::Text => {
            let path = output::write_response(artifacts.dir(), &result.text)?;
            println!("✅ Answer saved to {}", path.display());
        }
    }

    if let Some(id) = &result.id {
        println!("   Response id: {id} (pass --previous-response-id to continue)");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::PromptArgs;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("task.md"), "Add a greeting").unwrap();
        std::fs::write(dir.path().join("lib.rs"), "pub fn hi() {}\n").unwrap();
        dir
    }

    fn args(root: &Path) -> GenerateArgs {
        GenerateArgs {
            prompt: PromptArgs {
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
            },
            previous_response_id: None,
            output: None,
            no_call: false,
        }
    }

    #[tokio::test]
    async fn no_call_writes_only_the_prompt() {
        let dir = project();
        // Unreachable endpoint: any request would fail the run
        std::fs::write(
            dir.path().join("reporter.toml"),
            "[api]\nbase_url = \"http://127.0.0.1:9\"\n",
        )
        .unwrap();
        let mut a = args(dir.path());
        a.no_call = true;

        run(a, None).await.unwrap();

        let prompt = std::fs::read_to_string(dir.path().join(output::PROMPT_FILE)).unwrap();
        assert!(prompt.contains("Add a greeting"));
        assert!(prompt.contains("--- begin file lib.rs ---"));
        assert!(!dir.path().join(output::CURRENT_DIFF_FILE).exists());
        assert!(!dir.path().join("a.diff").exists());
    }

    #[tokio::test]
    async fn no_call_honors_output_path() {
        let dir = project();
        let target = dir.path().join("runs/step.md");
        let mut a = args(dir.path());
        a.no_call = true;
        a.output = Some(target.clone());

        run(a, None).await.unwrap();

        assert!(target.exists());
        assert!(!dir.path().join(output::PROMPT_FILE).exists());
    }

    #[tokio::test]
    async fn answer_lands_next_to_the_output_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_gen",
                "status": "completed",
                "output_text": "--- a/lib.rs\n+++ b/lib.rs\n"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = project();
        std::fs::write(
            dir.path().join("reporter.toml"),
            format!("[api]\napi_key = \"sk-test\"\nbase_url = \"{}\"\n", server.uri()),
        )
        .unwrap();
        let out_dir = dir.path().join("runs");
        let mut a = args(dir.path());
        a.output = Some(out_dir.join("step.md"));

        run(a, None).await.unwrap();

        assert!(out_dir.join("step.md").exists());
        assert_eq!(
            std::fs::read_to_string(out_dir.join(output::CURRENT_DIFF_FILE)).unwrap(),
            "--- a/lib.rs\n+++ b/lib.rs\n"
        );
        assert!(out_dir.join("a.diff").exists());
        assert!(!dir.path().join(output::CURRENT_DIFF_FILE).exists());
    }
}
