//! Command implementations for the Hanlex CLI.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::analysis::analyzer::Analyzer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PluginSettings;
use crate::error::{HanlexError, Result};
use crate::plugin::Plugin;
use crate::registry::TokenizerConfig;
use crate::summary::SummaryRequest;

/// Execute a CLI command.
pub fn execute_command(args: HanlexArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    match &args.command {
        Command::Tokenize(tokenize_args) => tokenize(tokenize_args, settings, &args),
        Command::Analyze(analyze_args) => analyze(analyze_args, settings, &args),
        Command::Schemes => list_schemes(settings, &args),
        Command::Sync(sync_args) => sync_once(sync_args, settings, &args),
        Command::Summarize(summarize_args) => summarize(summarize_args, settings, &args),
    }
}

/// Settings from the config file, with command line overrides applied.
fn load_settings(args: &HanlexArgs) -> Result<PluginSettings> {
    let mut settings = match &args.config {
        Some(path) => {
            debug!("loading settings from {}", path.display());
            PluginSettings::from_file(path)?
        }
        None => PluginSettings::default(),
    };
    if args.enable_cws {
        settings.enable_cws = true;
    }
    if let Command::Sync(sync_args) = &args.command {
        if let Some(server) = &sync_args.server {
            settings.server = Some(server.clone());
        }
    }
    Ok(settings)
}

/// Tokenize text with one scheme.
fn tokenize(args: &TokenizeArgs, settings: PluginSettings, cli_args: &HanlexArgs) -> Result<()> {
    let plugin = Plugin::new(settings)?;
    let config: TokenizerConfig = args.settings.iter().cloned().collect();
    let tokenizer = plugin.tokenizer(&args.scheme, &config)?;

    let text = input_text(args.text.as_deref())?;
    let tokens = tokenizer.tokenize(&text)?.collect();

    output_result(
        &format!("Tokens from scheme '{}'", args.scheme),
        &TokenList {
            name: args.scheme.clone(),
            tokens,
        },
        cli_args,
    )
}

/// Run text through a registered or ad-hoc analyzer.
fn analyze(args: &AnalyzeArgs, settings: PluginSettings, cli_args: &HanlexArgs) -> Result<()> {
    let plugin = Plugin::new(settings)?;
    let analyzer = match &args.scheme {
        Some(scheme) => plugin.analyzers().build(scheme, &args.filters)?,
        None => plugin.analyzer(&args.analyzer)?,
    };

    let text = input_text(args.text.as_deref())?;
    let tokens = analyzer.analyze(&text)?.collect();

    output_result(
        &format!("Tokens from analyzer '{}'", analyzer.name()),
        &TokenList {
            name: analyzer.name().to_string(),
            tokens,
        },
        cli_args,
    )
}

/// List available tokenizer schemes and analyzers.
fn list_schemes(settings: PluginSettings, cli_args: &HanlexArgs) -> Result<()> {
    let plugin = Plugin::new(settings)?;
    output_result(
        "Available schemes",
        &SchemeList {
            tokenizers: plugin.tokenizers().names(),
            analyzers: plugin.analyzers().names(),
        },
        cli_args,
    )
}

/// Run exactly one sync cycle against the configured resource server.
fn sync_once(_args: &SyncArgs, settings: PluginSettings, cli_args: &HanlexArgs) -> Result<()> {
    if settings.server.is_none() {
        return Err(HanlexError::invalid_config(
            "no resource server configured, use --server or the settings file",
        ));
    }
    let plugin = Plugin::new(settings)?;
    let Some(job) = plugin.sync_job() else {
        return Err(HanlexError::invalid_config("resource sync is not configured"));
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(job.on_tick());

    output_result(
        "Resource sync",
        &SyncReport {
            record: job.last_record(),
            versions: job.versions(),
        },
        cli_args,
    )
}

/// Summarize every document of a JSON or JSONL file.
fn summarize(args: &SummarizeArgs, settings: PluginSettings, cli_args: &HanlexArgs) -> Result<()> {
    let plugin = Plugin::new(settings)?;
    let request = SummaryRequest {
        field: args.field.clone(),
        size: args.size,
    };

    let content = read_source(&args.document_file)?;
    let documents = parse_documents(&content)?;

    let summaries: Vec<DocumentSummary> = documents
        .iter()
        .enumerate()
        .map(|(document, doc)| DocumentSummary {
            document,
            outcome: plugin.summarize(doc, &request),
        })
        .collect();

    output_result(
        &format!("Summaries of field '{}'", request.field),
        &summaries,
        cli_args,
    )
}

/// Parse a single JSON value, falling back to one document per line.
fn parse_documents(content: &str) -> Result<Vec<Value>> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(match value {
            Value::Array(items) => items,
            other => vec![other],
        });
    }
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(line_num, line)| {
            serde_json::from_str(line).map_err(|e| {
                HanlexError::invalid_config(format!("line {}: {e}", line_num + 1))
            })
        })
        .collect()
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn input_text(text: Option<&str>) -> Result<String> {
    match text {
        Some(text) => Ok(text.to_string()),
        None => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes)?;
            let text = String::from_utf8(bytes)
                .map_err(|e| HanlexError::malformed_input(e.to_string()))?;
            Ok(text.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_documents() {
        let docs = parse_documents(r#"{"content": "一"}"#).unwrap();
        assert_eq!(docs.len(), 1);

        let docs = parse_documents("{\"content\": \"一\"}\n\n{\"content\": \"二\"}\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["content"], "二");

        let docs = parse_documents(r#"[{"a": 1}, {"a": 2}, {"a": 3}]"#).unwrap();
        assert_eq!(docs.len(), 3);

        assert!(parse_documents("{oops}\n{}").is_err());
    }

    #[test]
    fn test_load_settings_overrides() {
        use clap::Parser;

        let args = HanlexArgs::try_parse_from([
            "hanlex",
            "--enable-cws",
            "sync",
            "--server",
            "http://nlp.local",
        ])
        .unwrap();
        let settings = load_settings(&args).unwrap();
        assert!(settings.enable_cws);
        assert_eq!(settings.server.as_deref(), Some("http://nlp.local"));
    }
}
