//! Plugin command

use allure_patch::constants::PLUGIN_MARKER;
use allure_patch::{Error, PluginManifest};
use anyhow::{Context, Result};
use console::style;

use crate::cli::PluginSourceArgs;
use crate::utils::{add_table_row, create_table, format_bytes};

/// List the plugin files a patch would install
pub fn execute(source: &PluginSourceArgs) -> Result<()> {
    let files = source.resolve().context("Failed to resolve plugin files")?;

    let mut table = create_table(&["Destination", "Source", "Size"]);
    let mut has_marker = false;
    for file in &files {
        let size = file
            .read_bytes()
            .with_context(|| format!("Failed to read {}", file.source()))?
            .len() as u64;
        add_table_row(
            &mut table,
            [
                file.destination().to_string(),
                file.source().to_string(),
                format_bytes(size),
            ],
        );

        if file.is_manifest() {
            let manifest = PluginManifest::parse(&file.read_lines()?);
            println!(
                "Plugin id: {}",
                style(manifest.id.as_deref().unwrap_or("<unset>")).yellow()
            );
            has_marker |= file.has_plugin_marker();
        }
    }
    table.printstd();

    if !has_marker {
        return Err(Error::MissingPluginMarker(PLUGIN_MARKER.to_string()).into());
    }
    println!("✓ Plugin manifest declares the resultiks id");
    Ok(())
}
