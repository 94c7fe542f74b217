//! Plugin file discovery
//!
//! A plugin is a set of files described by a manifest (`allure-plugin.yml`):
//! the manifest itself, an optional library jar and any number of static web
//! assets. The resolver turns such a file set into an ordered list of
//! [`PluginFile`]s, each pairing its destination inside the distribution with
//! the place its content is read from.
//!
//! Plugin files can come from a directory on disk ([`from_directory`]) or from
//! a [`ResourceBundle`] ([`from_bundle`]). Both produce the same result shape,
//! so the injection step never needs to know where a file came from.

mod bundle;
mod file;
mod manifest;
mod resolver;

pub use bundle::{ArchiveBundle, DirectoryBundle, EmbeddedBundle, ResourceBundle, bundle_at};
pub use file::{ContentSource, PluginFile};
pub use manifest::PluginManifest;
pub use resolver::{from_bundle, from_directory};
