//! Diff command

use allure_patch::{Archive, diff};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Print the entries unique to each of two archives
pub fn execute(first: &Path, second: &Path) -> Result<()> {
    let a = open(first)?;
    let b = open(second)?;

    let (alias_a, alias_b) = aliases(first, second);
    let result = diff(a.file_names(), &alias_a, b.file_names(), &alias_b);

    if result.is_empty() {
        println!("✓ Archives contain the same files");
        return Ok(());
    }

    for (alias, names) in result.iter() {
        println!(
            "Only in {} ({}):",
            style(alias).cyan(),
            style(names.len()).yellow()
        );
        for name in names {
            println!("  {name}");
        }
    }
    Ok(())
}

fn open(path: &Path) -> Result<Archive> {
    Archive::open(path).with_context(|| format!("Failed to open archive: {}", path.display()))
}

/// File names label the sides unless they collide
fn aliases(first: &Path, second: &Path) -> (String, String) {
    let short = |path: &Path| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    };
    let (a, b) = (short(first), short(second));
    if a == b {
        (first.display().to_string(), second.display().to_string())
    } else {
        (a, b)
    }
}
