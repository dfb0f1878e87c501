use std::io::{self, Read};

use clap::Args;
use serde_json::json;

use crate::app::Runtime;
use crate::categories::{Category, DEFAULT_CATEGORY_ID, category_label};
use crate::controller::{SubmitOutcome, SubmitRejected, ViewController};
use crate::errors::CliError;
use crate::report::render_plain;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Business idea text
    pub idea: Option<String>,
    /// Sector: fashion, household, tech, retail or other. Other values are sent as-is.
    #[arg(short = 'c', long = "category", default_value = DEFAULT_CATEGORY_ID)]
    pub category: String,
    /// Read the idea from stdin
    #[arg(long)]
    pub stdin: bool,
    /// Wrap width for the plain report
    #[arg(long, default_value_t = 88)]
    pub width: usize,
}

pub async fn handle(runtime: &Runtime, args: AnalyzeArgs) -> Result<(), CliError> {
    let idea = resolve_idea(&args)?;
    let client = runtime.gemini_client()?;

    if Category::from_id(&args.category).is_none() {
        tracing::info!(
            category = %args.category,
            "category outside the fixed set; sending as label"
        );
    }

    let mut controller = ViewController::new(&args.category);
    controller.set_idea(idea);

    runtime
        .output
        .print_stderr(&format!("Analyzing with {}...", client.model()));

    match controller.submit(&client).await {
        SubmitOutcome::Completed(result) => {
            if runtime.output.json {
                let entry = controller.history().get(0);
                runtime.output.print_json(&json!({
                    "id": entry.map(|e| e.id.clone()),
                    "createdAtMillis": entry.map(|e| e.created_at_millis),
                    "idea": controller.idea(),
                    "category": controller.category_id(),
                    "categoryLabel": category_label(controller.category_id()),
                    "analysis": result,
                }))?;
                return Ok(());
            }

            let report = render_plain(
                controller.idea(),
                &category_label(controller.category_id()),
                &result,
                args.width,
            );
            runtime.output.print_human(&report);
            Ok(())
        }
        SubmitOutcome::Failed(message) => Err(CliError::Server(message)),
        SubmitOutcome::Rejected(SubmitRejected::IdeaRequired) => Err(CliError::Usage(
            controller
                .error()
                .unwrap_or("idea required")
                .to_string(),
        )),
        SubmitOutcome::Rejected(SubmitRejected::Busy) => Err(CliError::Generic(
            "An analysis is already running.".to_string(),
        )),
        SubmitOutcome::Stale => Err(CliError::Generic(
            "The analysis outcome was discarded.".to_string(),
        )),
    }
}

fn resolve_idea(args: &AnalyzeArgs) -> Result<String, CliError> {
    if args.stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| CliError::Generic(format!("Failed reading stdin: {e}")))?;
        return Ok(input);
    }

    match &args.idea {
        Some(value) => Ok(value.clone()),
        None => Err(CliError::Usage(
            "Missing idea. Use `bizlens analyze \"...\"` or pass `--stdin`.".to_string(),
        )),
    }
}
