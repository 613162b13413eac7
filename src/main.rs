use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use glm_clipboard_core::installer::{Installer, InstallerPaths, PLUGIN_NAME};
use glm_clipboard_core::logging;

// ── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = PLUGIN_NAME,
    version,
    about = "Register the GLM clipboard image plugin with OpenCode",
    after_help = "Default behavior:\n  \
        - Adds plugin to ~/.config/opencode/opencode.jsonc (or .json)\n  \
        - Clears OpenCode plugin cache for this plugin"
)]
struct InstallerCli {
    /// Remove plugin entry from OpenCode config
    #[arg(long)]
    uninstall: bool,

    /// Print actions without writing files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = InstallerCli::parse();
    logging::init_from_env();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Installer failed:".red(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &InstallerCli) -> Result<()> {
    let installer = Installer::new(InstallerPaths::detect()?, cli.dry_run);

    let actions = if cli.uninstall {
        installer.uninstall().await?
    } else {
        installer.install().await?
    };

    let dry_run = installer.is_dry_run();
    for action in &actions {
        let line = action.describe(dry_run);
        if dry_run {
            println!("{} {}", "[dry-run]".yellow(), line);
        } else {
            println!("{line}");
        }
    }
    println!("{}", "Done. Restart OpenCode.".green());
    Ok(())
}
