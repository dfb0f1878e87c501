use serde_json::json;

use crate::analysis::schema::response_schema;
use crate::app::Runtime;
use crate::categories::ALL;
use crate::errors::CliError;

pub async fn handle(runtime: &Runtime) -> Result<(), CliError> {
    if runtime.output.json {
        let items: Vec<_> = ALL
            .iter()
            .map(|c| json!({ "id": c.id(), "label": c.label() }))
            .collect();
        runtime.output.print_json(&json!({ "categories": items }))?;
        return Ok(());
    }

    for cat in ALL {
        runtime
            .output
            .print_human(&format!("{:<10} {}", cat.id(), cat.label()));
    }
    Ok(())
}

pub async fn handle_schema(runtime: &Runtime) -> Result<(), CliError> {
    let schema = response_schema();
    if runtime.output.json {
        return runtime.output.print_json(&schema);
    }
    runtime
        .output
        .print_human(&serde_json::to_string_pretty(&schema)?);
    Ok(())
}
