//! Patch command

use allure_patch::{LogLevel, PatchEvent, PatchOptions, PatchOutcome, PatchReport};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::cli::PluginSourceArgs;
use crate::utils::create_progress_bar;

/// Patch `archive` and report progress on the terminal
pub fn execute(archive: &Path, source: &PluginSourceArgs, suffix: &str, json: bool) -> Result<()> {
    let pipeline = source
        .pipeline(PatchOptions::new().output_marker(suffix))
        .context("Failed to open plugin resources")?;
    let handle = pipeline
        .spawn(source.request(archive))
        .context("Failed to start patch worker")?;

    if json {
        for event in handle.events() {
            println!("{}", serde_json::to_string(&event)?);
        }
        handle
            .wait()
            .with_context(|| format!("Failed to patch {}", archive.display()))?;
        return Ok(());
    }

    let pb = create_progress_bar("Starting");
    for event in handle.events() {
        match event {
            PatchEvent::Progress(progress) => {
                pb.set_position(u64::from(progress.percent));
                pb.set_message(progress.label);
            }
            PatchEvent::Log { level, message } => match level {
                LogLevel::Warn => pb.println(format!("{} {message}", style("warning:").yellow())),
                LogLevel::Error => pb.println(format!("{} {message}", style("error:").red())),
                LogLevel::Debug | LogLevel::Info => {}
            },
            PatchEvent::Finished(PatchOutcome::Succeeded { .. }) => pb.finish_and_clear(),
            PatchEvent::Finished(PatchOutcome::Failed { .. }) => pb.abandon(),
        }
    }

    let report = handle
        .wait()
        .with_context(|| format!("Failed to patch {}", archive.display()))?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &PatchReport) {
    println!("✓ Patched {}", style(report.source.display()).cyan());
    println!("  Output:  {}", style(report.output.display()).cyan());
    println!("  Version: {}", style(&report.version).yellow());
    println!("  Injected {} file(s):", style(report.injected.len()).green());
    for name in &report.injected {
        println!("    {name}");
    }
    if report.config_updated {
        println!("  Plugin registered in {}", allure_patch::constants::CONFIG_PATH);
    } else {
        println!(
            "  Plugin already registered in {}",
            allure_patch::constants::CONFIG_PATH
        );
    }
}
