use std::path::PathBuf;

use regex::Regex;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::oracle::ContentDirectory;
use crate::types::{EntityReference, ResourceType};

/// Prefix marking an image macro inside `[[...]]`.
const IMAGE_PREFIX: &str = "image:";

/// Separates a link label from its target.
const LABEL_SEPARATOR: &str = ">>";

/// Separates a link target from its parameters.
const PARAMETER_SEPARATOR: &str = "||";

/// A link or image found in a content page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link or image.
    pub kind: LinkKind,
    /// 1-based line the link starts on.
    pub line: u32,
    /// Target text as written, without label, parameters or `image:` prefix.
    pub target: String,
}

/// How a link was written, which decides the type of an untyped target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// `[[image:target]]`: untyped targets are attachments.
    Image,
    /// `[[target]]` or `[[label>>target]]`: untyped targets are documents.
    Link,
}

/// A content page and the links written in it.
#[derive(Debug, Clone)]
pub struct Page {
    /// Absolute document reference derived from the file path.
    pub document: EntityReference,
    /// Links in source order.
    pub links: Vec<Link>,
    /// File path relative to the content root.
    pub path: PathBuf,
}

impl LinkKind {
    /// Resource type assumed when the target has no known scheme.
    pub const fn default_type(self) -> ResourceType {
        return match self {
            Self::Image => ResourceType::ATTACHMENT,
            Self::Link => ResourceType::DOCUMENT,
        };
    }
}

/// Scan every document file under the content root and extract its links.
///
/// Applies the config's include/exclude filters to paths relative to the root.
/// Files that do not map to a `<wiki>/<space>/.../<document>` location are skipped.
///
/// # Errors
///
/// Returns `Error::ContentRootNotFound` if the root is not a directory,
/// or `Error::Io` if a content file cannot be read.
///
/// # Panics
///
/// Panics if the hardcoded link regex is invalid (compile-time invariant).
pub fn scan(content: &ContentDirectory, config: &Config) -> Result<Vec<Page>, Error> {
    let root = content.root();
    if !root.is_dir() {
        return Err(Error::ContentRootNotFound {
            path: root.to_path_buf(),
        });
    }

    let pattern = Regex::new(r"\[\[(.+?)\]\]").expect("valid regex");
    let mut pages = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
    {
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        if !config.should_scan(&relative.to_string_lossy()) {
            continue;
        }
        let Some(document) = content.document_reference(path) else {
            continue;
        };

        let text = std::fs::read_to_string(path)?;
        pages.push(Page {
            document,
            links: extract_links(&text, &pattern),
            path: relative,
        });
    }

    return Ok(pages);
}

/// Extract every `[[...]]` link from page text.
fn extract_links(text: &str, pattern: &Regex) -> Vec<Link> {
    let mut links = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let number = u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX);
        for cap in pattern.captures_iter(line) {
            if let Some(link) = parse_link_body(&cap[1], number) {
                links.push(link);
            }
        }
    }
    return links;
}

/// Split `label>>target||params` or `image:target||params` into a link.
/// Returns `None` for an empty target.
fn parse_link_body(body: &str, line: u32) -> Option<Link> {
    let body = body.split_once(PARAMETER_SEPARATOR).map_or(body, |(head, _)| return head);
    let (kind, target) = body.strip_prefix(IMAGE_PREFIX).map_or_else(
        || {
            let target = body.rsplit_once(LABEL_SEPARATOR).map_or(body, |(_, target)| return target);
            return (LinkKind::Link, target);
        },
        |target| return (LinkKind::Image, target),
    );

    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    return Some(Link {
        kind,
        line,
        target: target.to_string(),
    });
}

/// Path of `page` relative to the working directory, for reporting.
pub fn display_path(content: &ContentDirectory, page: &Page) -> String {
    return content.root().join(&page.path).display().to_string();
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn links(text: &str) -> Vec<Link> {
        let pattern = Regex::new(r"\[\[(.+?)\]\]").unwrap();
        return extract_links(text, &pattern);
    }

    #[test]
    fn labelled_and_bare_links() {
        let found = links("See [[the guide>>Docs.Guide]] and [[Sandbox]].");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].target, "Docs.Guide");
        assert_eq!(found[0].kind, LinkKind::Link);
        assert_eq!(found[1].target, "Sandbox");
    }

    #[test]
    fn images_default_to_attachments() {
        let found = links("[[image:logo.png||width=\"100\"]]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, LinkKind::Image);
        assert_eq!(found[0].target, "logo.png");
        assert_eq!(found[0].kind.default_type(), ResourceType::ATTACHMENT);
    }

    #[test]
    fn parameters_are_ignored() {
        let found = links("[[Label>>attach:Page@f.pdf||target=\"_blank\"]]");
        assert_eq!(found[0].target, "attach:Page@f.pdf");
    }

    #[test]
    fn line_numbers_are_one_based() {
        let found = links("first\nsecond [[A.B]]\n");
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn empty_targets_are_skipped() {
        assert!(links("[[label>>]] [[ ]]").is_empty());
    }

    #[test]
    fn scan_maps_files_to_documents() {
        let dir = tempfile::tempdir().unwrap();
        let space = dir.path().join("xwiki").join("Docs");
        std::fs::create_dir_all(&space).unwrap();
        std::fs::write(space.join("Guide.xwiki"), "[[Other]]\n").unwrap();
        std::fs::write(dir.path().join("README.txt"), "not content").unwrap();

        let content = ContentDirectory::new(dir.path(), "xwiki");
        let pages = scan(&content, &Config::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].document.to_string(), "xwiki:Docs.Guide");
        assert_eq!(pages[0].links[0].target, "Other");
    }

    #[test]
    fn missing_root_is_an_error() {
        let content = ContentDirectory::new("/nonexistent/wikiref/content", "xwiki");
        assert!(matches!(
            scan(&content, &Config::default()),
            Err(Error::ContentRootNotFound { .. })
        ));
    }
}
