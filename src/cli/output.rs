//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::cli::args::{HanlexArgs, OutputFormat};
use crate::error::Result;
use crate::resource::{ResourceVersion, SyncRecord};
use crate::summary::SummaryOutcome;

/// Result structure for tokenize and analyze.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenList {
    pub name: String,
    pub tokens: Vec<Token>,
}

/// Available schemes and analyzers.
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemeList {
    pub tokenizers: Vec<String>,
    pub analyzers: Vec<String>,
}

/// Outcome of one sync cycle plus the versions active afterwards.
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncReport {
    pub record: Option<SyncRecord>,
    pub versions: Vec<ResourceVersion>,
}

/// Summary of one input document.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub document: usize,
    pub outcome: SummaryOutcome,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &HanlexArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Csv => output_csv(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &HanlexArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;

    match result {
        _ if std::any::type_name::<T>().contains("TokenList") => output_tokens_human(&value),
        _ => output_generic_human(&value),
    }
}

/// Output tokens one per line: position, offsets, type, text.
fn output_tokens_human(value: &serde_json::Value) -> Result<()> {
    let tokens = value["tokens"].as_array().cloned().unwrap_or_default();
    for token in &tokens {
        println!(
            "{:>4}  {:>4}..{:<4}  {:<13}  {}",
            format_value(&token["position"]),
            format_value(&token["start_offset"]),
            format_value(&token["end_offset"]),
            format_value(&token["token_type"]),
            format_value(&token["text"]),
        );
    }
    if tokens.is_empty() {
        println!("(no tokens)");
    }
    Ok(())
}

/// Output generic data in human format.
fn output_generic_human(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &HanlexArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Output in CSV format. Token lists become one row per token.
fn output_csv<T: Serialize>(result: &T, _args: &HanlexArgs) -> Result<()> {
    let value = serde_json::to_value(result)?;
    let rows = match &value {
        serde_json::Value::Object(obj) => obj
            .get("tokens")
            .and_then(|tokens| tokens.as_array())
            .cloned(),
        serde_json::Value::Array(arr) => Some(arr.clone()),
        _ => None,
    };

    match rows {
        Some(rows) => {
            for line in csv_lines(&rows) {
                println!("{line}");
            }
        }
        None => {
            println!("value");
            println!("{}", format_csv_value(&value));
        }
    }

    Ok(())
}

/// Header plus one line per object row. Rows may omit keys, so the header
/// is the union of keys in first-seen order and missing cells stay empty.
fn csv_lines(rows: &[serde_json::Value]) -> Vec<String> {
    let objects: Vec<_> = rows.iter().filter_map(|row| row.as_object()).collect();
    let mut headers: Vec<&str> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }
    if headers.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![headers.join(",")];
    for obj in &objects {
        let values: Vec<String> = headers
            .iter()
            .map(|h| obj.get(*h).map(format_csv_value).unwrap_or_default())
            .collect();
        lines.push(values.join(","));
    }
    lines
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        serde_json::Value::Object(_) => value.to_string(),
    }
}

/// Format a value for CSV output, quoting when needed.
fn format_csv_value(value: &serde_json::Value) -> String {
    let raw = format_value(value);
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw
    }
}
