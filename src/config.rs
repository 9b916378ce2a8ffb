use std::path::{Path, PathBuf};

use crate::context::ModelDefaults;
use crate::error::Error;
use crate::oracle::ContentDirectory;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = ".wikiref.toml";

/// Project configuration loaded from `.wikiref.toml`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Where wiki content lives and which of it is scanned.
    pub content: ContentConfig,
    /// Default names used to complete references.
    pub defaults: ModelDefaults,
}

/// The `[content]` table.
/// Include/exclude patterns are path prefixes relative to the content root.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Path prefixes never scanned.
    pub exclude: Vec<String>,
    /// Extension of document files, without the dot.
    pub extension: String,
    /// Path prefixes scanned; empty means everything.
    pub include: Vec<String>,
    /// Directory holding one subdirectory per wiki.
    pub root: PathBuf,
}

/// Raw TOML structure for `.wikiref.toml`.
#[derive(serde::Deserialize)]
struct WikirefTomlConfig {
    /// `[content]` table.
    #[serde(default)]
    content: ContentConfig,
    /// `[defaults]` table.
    #[serde(default)]
    defaults: ModelDefaults,
}

impl Config {
    /// Existence oracle over the configured content root, resolved against `root`.
    pub fn content_directory(&self, root: &Path) -> ContentDirectory {
        return ContentDirectory::new(root.join(&self.content.root), self.content.extension.clone());
    }

    /// Load config from `.wikiref.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed: a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: WikirefTomlConfig = toml::from_str(&content)?;
        return Ok(Self {
            content: raw.content,
            defaults: raw.defaults,
        });
    }

    /// Check whether a content file path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.content.include.is_empty()
            || self.content.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.content.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        return Self {
            exclude: Vec::new(),
            extension: "xwiki".to_string(),
            include: Vec::new(),
            root: PathBuf::from("content"),
        };
    }
}
