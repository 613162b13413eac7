//! Hook bridge: runs the clipboard image hook over one chat message.
//!
//! Reads `{"input": ..., "output": ...}` from stdin and writes the rewritten
//! `output` to stdout. The output object is echoed as received; only `parts`
//! is replaced, and only if a hook changed it. Configuration comes from the environment on every run,
//! so each message sees the current `TMPDIR` and max-age settings.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use glm_clipboard_core::logging::{self, LogConfig};
use glm_clipboard_core::{
    ChatInput, ChatOutput, ClipboardConfig, ClipboardImageHook, HookRegistry, Part,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "glm-clipboard-hook",
    version,
    about = "Rewrite pasted images in a chat message into local file references"
)]
struct HookCli {
    /// Pretty-print the rewritten output
    #[arg(long)]
    pretty: bool,

    /// Verbose logging (to stderr)
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct HookInvocation {
    #[serde(default)]
    input: ChatInput,
    output: Value,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = HookCli::parse();
    if cli.verbose {
        logging::init(LogConfig::debug());
    } else {
        logging::init_from_env();
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("glm-clipboard-hook: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &HookCli) -> Result<()> {
    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("Failed to read hook payload from stdin")?;
    let HookInvocation { input, output: raw_output } =
        serde_json::from_str(&raw).context("Invalid hook payload")?;
    let mut output: ChatOutput =
        serde_json::from_value(raw_output.clone()).context("Invalid hook payload")?;
    let original_parts = output.parts.clone();

    let config = ClipboardConfig::from_env();
    debug!(dir = %config.save_dir().display(), max_age = ?config.max_age, "Loaded clipboard config");

    let mut registry = HookRegistry::new();
    registry.register(Arc::new(ClipboardImageHook::new(&config)));
    registry.invoke(&input, &mut output).await?;

    let result = splice_parts(raw_output, &output, &original_parts)?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{rendered}");
    Ok(())
}

/// The received `output` with `parts` swapped for the rewritten ones, if any
/// part changed.
fn splice_parts(mut raw_output: Value, output: &ChatOutput, original: &[Part]) -> Result<Value> {
    if output.parts.as_slice() == original {
        return Ok(raw_output);
    }
    if let Value::Object(fields) = &mut raw_output {
        fields.insert("parts".to_string(), serde_json::to_value(&output.parts)?);
    }
    Ok(raw_output)
}
