//! Existence oracles: answer whether an absolute document reference names
//! stored content.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::{EntityReference, EntityType};

/// Pure, possibly I/O-bound predicate over absolute document references.
pub trait ExistenceOracle: Send + Sync {
    /// Whether `document` exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the check could not complete; resolvers treat
    /// that as "does not exist".
    fn exists(&self, document: &EntityReference) -> Result<bool, Error>;
}

/// Documents stored as files: `<root>/<wiki>/<space>/.../<document>.<extension>`.
#[derive(Debug, Clone)]
pub struct ContentDirectory {
    /// File extension of document files, without the dot.
    extension: String,
    /// Directory holding one subdirectory per wiki.
    root: PathBuf,
}

/// In-memory set of existing documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    /// Absolute document references known to exist.
    documents: HashSet<EntityReference>,
}

impl<F> ExistenceOracle for F
where
    F: Fn(&EntityReference) -> Result<bool, Error> + Send + Sync,
{
    fn exists(&self, document: &EntityReference) -> Result<bool, Error> {
        return self(document);
    }
}

impl ContentDirectory {
    /// File backing an absolute document reference. Returns `None` for
    /// relative references and for names that cannot be a path component.
    pub fn document_path(&self, document: &EntityReference) -> Option<PathBuf> {
        if document.kind() != EntityType::Document || !document.is_absolute() {
            return None;
        }

        let mut path = self.root.clone();
        let chain = document.chain();
        let (leaf, containers) = chain.split_last()?;
        for segment in containers {
            path.push(checked_component(segment.name())?);
        }
        path.push(format!("{}.{}", checked_component(leaf.name())?, self.extension));
        return Some(path);
    }

    /// Absolute document reference for a document file under the root.
    /// Returns `None` for files outside the `<wiki>/<space>.../<doc>` layout.
    pub fn document_reference(&self, path: &Path) -> Option<EntityReference> {
        let relative = path.strip_prefix(&self.root).ok()?;
        if relative.extension().and_then(|e| return e.to_str()) != Some(self.extension.as_str()) {
            return None;
        }

        let mut names: Vec<String> = relative
            .parent()?
            .components()
            .map(|c| return c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let document = relative.file_stem()?.to_string_lossy().into_owned();
        if names.len() < 2 {
            return None;
        }

        let wiki = names.remove(0);
        let segments = std::iter::once((EntityType::Wiki, wiki))
            .chain(names.into_iter().map(|name| return (EntityType::Space, name)))
            .chain(std::iter::once((EntityType::Document, document)));
        return EntityReference::from_segments(segments);
    }

    /// File extension of document files.
    pub fn extension(&self) -> &str {
        return &self.extension;
    }

    /// Content directory rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        return Self {
            extension: extension.into(),
            root: root.into(),
        };
    }

    /// Directory holding the wikis.
    pub fn root(&self) -> &Path {
        return &self.root;
    }
}

impl ExistenceOracle for ContentDirectory {
    fn exists(&self, document: &EntityReference) -> Result<bool, Error> {
        let Some(path) = self.document_path(document) else {
            return Ok(false);
        };
        return match std::fs::metadata(&path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::OracleFailed {
                reason: e.to_string(),
                reference: document.to_string(),
            }),
        };
    }
}

impl DocumentSet {
    /// Whether `document` is in the set.
    pub fn contains(&self, document: &EntityReference) -> bool {
        return self.documents.contains(document);
    }

    /// Add a document. Returns `false` if it was already present.
    pub fn insert(&mut self, document: EntityReference) -> bool {
        return self.documents.insert(document);
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        return self.documents.is_empty();
    }

    /// Number of documents in the set.
    pub fn len(&self) -> usize {
        return self.documents.len();
    }
}

impl ExistenceOracle for DocumentSet {
    fn exists(&self, document: &EntityReference) -> Result<bool, Error> {
        return Ok(self.contains(document));
    }
}

impl FromIterator<EntityReference> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = EntityReference>>(iter: I) -> Self {
        return Self {
            documents: iter.into_iter().collect(),
        };
    }
}

/// Reject names that would escape or collapse the directory layout.
fn checked_component(name: &str) -> Option<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return None;
    }
    return Some(name);
}

/// Ask the oracle, mapping failures to "does not exist" with a warning.
/// The conservative answer steers fallback toward a space home page.
pub fn document_exists(oracle: &dyn ExistenceOracle, document: &EntityReference) -> bool {
    return match oracle.exists(document) {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(reference = %document, error = %e, "existence check failed, treating document as missing");
            false
        },
    };
}
