//! Info command

use allure_patch::constants::{CONFIG_PATH, MANIFEST_FILE, PLUGIN_DIR, REGISTRATION_LINE};
use allure_patch::path::join_entry;
use allure_patch::{Archive, is_target_archive, parse_version};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::utils::{create_spinner, format_bytes, format_flag, format_root};

/// Show what an archive contains and whether it is already patched
pub fn execute(archive: &Path) -> Result<()> {
    let spinner = create_spinner("Reading archive...");
    let opened = Archive::open(archive)
        .with_context(|| format!("Failed to open archive: {}", archive.display()));
    spinner.finish_and_clear();
    let opened = opened?;

    let total: u64 = opened.files().values().map(|data| data.len() as u64).sum();
    let is_allure = is_target_archive(&opened);
    let plugin_installed = opened.contains(&join_entry(&[PLUGIN_DIR, MANIFEST_FILE]));
    let plugin_registered = opened
        .read_text(CONFIG_PATH)
        .map(|config| config.contains(REGISTRATION_LINE))
        .unwrap_or(false);

    println!("{}", style("Archive Information").bold().underlined());
    println!("File:       {}", style(archive.display()).cyan());
    println!("Root:       {}", format_root(opened.root_dir()));
    println!("Entries:    {}", style(opened.len()).green());
    println!("Total size: {}", format_bytes(total));
    println!("Allure distribution: {}", format_flag(is_allure));
    if is_allure {
        println!(
            "Version:    {}",
            style(parse_version(&opened)).yellow()
        );
    }
    println!("Plugin installed:  {}", format_flag(plugin_installed));
    println!("Plugin registered: {}", format_flag(plugin_registered));

    Ok(())
}
