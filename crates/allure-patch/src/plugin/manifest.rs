//! Plugin manifest parser
//!
//! `allure-plugin.yml` is read line by line rather than as YAML. Only the
//! directives that decide which files belong to the plugin are recognized:
//!
//! ```yaml
//! id: resultiks
//! extensions:
//!   - io.example.ResultiksPlugin
//! jsFiles:
//!   - index.js
//! cssFiles:
//!   - styles.css
//! ```

/// Section of the manifest the parser is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Extensions,
    Static,
}

/// Parsed form of a plugin manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginManifest {
    /// Value of the `id:` line, if any
    pub id: Option<String>,
    /// First item under `extensions:`
    ///
    /// A plugin that declares an extension ships a library jar.
    pub extension: Option<String>,
    /// Items under `jsFiles:` and `cssFiles:`, in declaration order
    pub static_files: Vec<String>,
}

impl PluginManifest {
    /// Parse manifest lines
    ///
    /// A list section lasts until the first line that is not a `-` item.
    /// Blank lines and `#` comments are skipped without closing the section.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut manifest = Self::default();
        let mut section = Section::None;

        for line in lines {
            let trimmed = line.as_ref().trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(item) = trimmed.strip_prefix('-') {
                let item = unquote(item.trim());
                if item.is_empty() {
                    continue;
                }
                match section {
                    Section::Extensions if manifest.extension.is_none() => {
                        manifest.extension = Some(item.to_string());
                    }
                    Section::Static => manifest.static_files.push(item.to_string()),
                    _ => {}
                }
                continue;
            }

            section = if trimmed.starts_with("extensions:") {
                Section::Extensions
            } else if trimmed.starts_with("jsFiles:") || trimmed.starts_with("cssFiles:") {
                Section::Static
            } else {
                if manifest.id.is_none() {
                    if let Some(id) = trimmed.strip_prefix("id:") {
                        manifest.id = Some(unquote(id.trim()).to_string());
                    }
                }
                Section::None
            };
        }

        log::trace!("Parsed manifest: {manifest:?}");
        manifest
    }

    /// Whether the plugin declares an extension and therefore ships a jar
    pub fn has_library(&self) -> bool {
        self.extension.is_some()
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}
