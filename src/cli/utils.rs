use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Read;

use crate::cli::OutputFormat;
use crate::workflow::{StepOutcome, WorkflowReport};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(fields)) = (data, response.as_object_mut()) {
                fields.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print `items` as JSON under `collection_name`, or as text rows via `row`
pub fn output_collection<T: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    items: &[T],
    header: &str,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if items.is_empty() {
        return output_empty_collection(output_format, collection_name, &format!("No {} found", collection_name));
    }

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: items
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", header);
            println!("{}", "-".repeat(header.len().max(20)));
            for item in items {
                println!("{}", row(item));
            }
        }
    }
    Ok(())
}

/// Print one record, pretty JSON in both formats
pub fn output_record<T: Serialize>(output_format: &OutputFormat, item_type: &str, item: Option<&T>) -> anyhow::Result<()> {
    let Some(item) = item else {
        anyhow::bail!("{} not found", item_type);
    };
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ item_type: item }))?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(item)?),
    }
    Ok(())
}

/// Print a workflow report. A run that did not complete is an error so the
/// process exits non-zero.
pub fn output_report(output_format: &OutputFormat, report: &WorkflowReport) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(report)?;
            value["status"] = serde_json::to_value(report.status())?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            for (i, record) in report.steps.iter().enumerate() {
                let mark = match &record.outcome {
                    StepOutcome::Succeeded => "✓".to_string(),
                    StepOutcome::Failed(e) => format!("✗ {}", e),
                    StepOutcome::Skipped => "- skipped".to_string(),
                };
                println!("{:>2}. {:<50} {}", i + 1, record.step.to_string(), mark);
            }
        }
    }

    if report.is_complete() {
        return Ok(());
    }
    match report.failure() {
        Some(record) => anyhow::bail!(
            "{} stopped at '{}'; completed steps were kept and need manual reconciliation",
            report.workflow,
            record.step
        ),
        None => anyhow::bail!("{} did not complete", report.workflow),
    }
}

/// Read a JSON document from stdin into `T`
pub fn read_stdin_json<T: DeserializeOwned>() -> anyhow::Result<T> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    parse_json_input(&input)
}

pub fn parse_json_input<T: DeserializeOwned>(input: &str) -> anyhow::Result<T> {
    if input.trim().is_empty() {
        anyhow::bail!("expected a JSON document on stdin");
    }
    serde_json::from_str(input).map_err(|e| anyhow::anyhow!("invalid JSON input: {}", e))
}

/// Read one line from stdin, for passwords not given as flags
pub fn read_stdin_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}: ", prompt);
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
