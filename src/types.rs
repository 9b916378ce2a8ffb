//! Core domain types: entity references, resource types and resource references.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// Scheme prefix that selects the relative resolver family for a resource type.
pub const RELATIVE_PREFIX: &str = "relative/";

/// Immutable chain of typed, named segments identifying a wiki entity.
/// Parents are shared, so references built from a common prefix share it.
/// Equality and hashing are structural over the whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityReference {
    /// Kind of this (innermost) segment.
    kind: EntityType,
    /// Segment name; may be empty for permissively parsed input.
    name: String,
    /// Enclosing segment, `None` for the root.
    parent: Option<Arc<EntityReference>>,
}

/// Kind of a single segment of an entity reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A file attached to a document.
    Attachment,
    /// A wiki document (page) inside a space.
    Document,
    /// A nested page, the page-oriented view of a space home.
    Page,
    /// A file attached to a nested page.
    PageAttachment,
    /// A space; repeatable to form a space path.
    Space,
    /// The wiki root of an absolute reference.
    Wiki,
}

/// The as-authored reference, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    /// Base reference strings, resolved in order to anchor `reference`.
    pub base_references: Vec<String>,
    /// Raw target string, without its type prefix.
    pub reference: String,
    /// Declared kind identifier (scheme).
    pub resource_type: ResourceType,
    /// Whether the author wrote the type prefix explicitly.
    pub typed: bool,
}

/// Kind identifier of a resource reference, e.g. `doc` or `attach`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType(Cow<'static, str>);

impl EntityReference {
    /// Iterate from this segment up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Self> {
        return std::iter::successors(Some(self), |r| return r.parent());
    }

    /// Segments ordered root first.
    pub fn chain(&self) -> Vec<&Self> {
        let mut chain: Vec<&Self> = self.ancestors().collect();
        chain.reverse();
        return chain;
    }

    /// A new reference nested directly under this one.
    /// Returns `None` when a `kind` segment cannot sit under this one.
    pub fn child(&self, kind: EntityType, name: impl Into<String>) -> Option<Self> {
        return self.clone().nest(kind, name);
    }

    /// Absolute document reference built from plain names. Mostly useful for
    /// callers and tests that already know the full location.
    /// Returns `None` without spaces, since a document never sits on a wiki.
    pub fn document_at(wiki: &str, spaces: &[&str], document: &str) -> Option<Self> {
        let spaces = spaces.iter().map(|space| return (EntityType::Space, *space));
        return Self::from_segments(
            std::iter::once((EntityType::Wiki, wiki))
                .chain(spaces)
                .chain(std::iter::once((EntityType::Document, document))),
        );
    }

    /// Nearest segment of `kind`, starting from this one and walking up.
    pub fn extract(&self, kind: EntityType) -> Option<&Self> {
        return self.ancestors().find(|r| return r.kind == kind);
    }

    /// Build a chain from root-first `(kind, name)` pairs.
    /// Returns `None` for an empty sequence or when a segment cannot sit
    /// under the one before it.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = (EntityType, S)>,
        S: Into<String>,
    {
        let mut current: Option<Self> = None;
        for (kind, name) in segments {
            current = Some(match current {
                None => Self::new(kind, name),
                Some(parent) => parent.nest(kind, name)?,
            });
        }
        return current;
    }

    /// Whether this segment has an enclosing segment.
    pub const fn has_parent(&self) -> bool {
        return self.parent.is_some();
    }

    /// A reference is absolute iff its root segment is a wiki.
    pub fn is_absolute(&self) -> bool {
        return self.root().kind == EntityType::Wiki;
    }

    /// Whether this is a document named after the space home page.
    pub fn is_home_page(&self, home: &str) -> bool {
        return self.kind == EntityType::Document && self.name == home;
    }

    /// Kind of the innermost segment.
    pub const fn kind(&self) -> EntityType {
        return self.kind;
    }

    /// Name of the innermost segment.
    pub fn name(&self) -> &str {
        return &self.name;
    }

    /// Names of every segment of `kind`, root first.
    pub fn names_of(&self, kind: EntityType) -> Vec<&str> {
        return self
            .chain()
            .into_iter()
            .filter(|r| return r.kind == kind)
            .map(|r| return r.name.as_str())
            .collect();
    }

    /// Consume `self` as the parent of a new segment, if `kind` may nest here.
    fn nest(self, kind: EntityType, name: impl Into<String>) -> Option<Self> {
        if !kind.accepts_parent(Some(self.kind)) {
            return None;
        }
        return Some(Self {
            kind,
            name: name.into(),
            parent: Some(Arc::new(self)),
        });
    }

    /// A root segment with no parent.
    pub fn new(kind: EntityType, name: impl Into<String>) -> Self {
        return Self {
            kind,
            name: name.into(),
            parent: None,
        };
    }

    /// Enclosing segment, if any.
    pub fn parent(&self) -> Option<&Self> {
        return self.parent.as_deref();
    }

    /// Outermost segment of the chain.
    pub fn root(&self) -> &Self {
        return self.ancestors().last().unwrap_or(self);
    }
}

impl fmt::Display for EntityReference {
    /// Canonical serialized form, e.g. `xwiki:Space.Page@file.png`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{parent}{}", separator_between(parent.kind, self.kind))?;
        }
        return f.write_str(&escape_name(&self.name, self.kind));
    }
}

impl EntityType {
    /// Whether a segment of this kind may sit directly under `parent`
    /// (`None` meaning the segment is a root).
    pub const fn accepts_parent(self, parent: Option<Self>) -> bool {
        return matches!(
            (self, parent),
            (_, None)
                | (Self::Attachment, Some(Self::Document))
                | (Self::Document | Self::Space, Some(Self::Space))
                | (Self::Page | Self::Space, Some(Self::Wiki))
                | (Self::Page | Self::PageAttachment, Some(Self::Page))
        );
    }

    /// Lowercase name used in CLI arguments and JSON output.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::Attachment => "attachment",
            Self::Document => "document",
            Self::Page => "page",
            Self::PageAttachment => "page_attachment",
            Self::Space => "space",
            Self::Wiki => "wiki",
        };
    }

    /// Page and page-attachment references use the page hierarchy
    /// instead of spaces and documents.
    pub const fn is_page_family(self) -> bool {
        return matches!(self, Self::Page | Self::PageAttachment);
    }
}

impl fmt::Display for EntityType {
    /// Same text as `as_str`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.as_str());
    }
}

impl FromStr for EntityType {
    type Err = Error;

    /// Accepts the `as_str` names plus the resource scheme spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "attach" | "attachment" => Ok(Self::Attachment),
            "doc" | "document" => Ok(Self::Document),
            "page" => Ok(Self::Page),
            "pageAttach" | "page_attachment" => Ok(Self::PageAttachment),
            "space" => Ok(Self::Space),
            "wiki" => Ok(Self::Wiki),
            _ => Err(Error::InvalidEntityType { name: s.to_string() }),
        };
    }
}

impl ResourceReference {
    /// Create a reference with no base references.
    pub fn new(resource_type: ResourceType, reference: impl Into<String>, typed: bool) -> Self {
        return Self {
            base_references: Vec::new(),
            reference: reference.into(),
            resource_type,
            typed,
        };
    }

    /// Reference whose type prefix was written explicitly.
    pub fn typed(resource_type: ResourceType, reference: impl Into<String>) -> Self {
        return Self::new(resource_type, reference, true);
    }

    /// Reference whose type must be inferred.
    pub fn untyped(resource_type: ResourceType, reference: impl Into<String>) -> Self {
        return Self::new(resource_type, reference, false);
    }

    /// Append one base reference; later bases are resolved against earlier ones.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_references.push(base.into());
        return self;
    }
}

impl fmt::Display for ResourceReference {
    /// The reference as an author would write it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.typed {
            return write!(f, "{}:{}", self.resource_type, self.reference);
        }
        return f.write_str(&self.reference);
    }
}

impl ResourceType {
    /// Attachment of a document.
    pub const ATTACHMENT: Self = Self(Cow::Borrowed("attach"));
    /// Wiki document.
    pub const DOCUMENT: Self = Self(Cow::Borrowed("doc"));
    /// Mail address; never resolved to an entity.
    pub const MAILTO: Self = Self(Cow::Borrowed("mailto"));
    /// Nested page.
    pub const PAGE: Self = Self(Cow::Borrowed("page"));
    /// Attachment of a nested page.
    pub const PAGE_ATTACHMENT: Self = Self(Cow::Borrowed("pageAttach"));
    /// Space.
    pub const SPACE: Self = Self(Cow::Borrowed("space"));
    /// External URL; never resolved to an entity.
    pub const URL: Self = Self(Cow::Borrowed("url"));

    /// The absolute-family scheme this type belongs to.
    #[must_use]
    pub fn absolute(&self) -> Self {
        return self
            .0
            .strip_prefix(RELATIVE_PREFIX)
            .map_or_else(|| return self.clone(), Self::new);
    }

    /// Scheme text.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    /// Whether this scheme names a relative-family resolver.
    pub fn is_relative(&self) -> bool {
        return self.0.starts_with(RELATIVE_PREFIX);
    }

    /// Arbitrary scheme, e.g. one registered by a plugin.
    pub fn new(scheme: impl Into<String>) -> Self {
        return Self(Cow::Owned(scheme.into()));
    }

    /// The relative-family scheme derived from this one.
    #[must_use]
    pub fn relative(&self) -> Self {
        if self.is_relative() {
            return self.clone();
        }
        return Self::new(format!("{RELATIVE_PREFIX}{}", self.0));
    }
}

impl fmt::Display for ResourceType {
    /// Scheme text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

impl serde::Serialize for ResourceType {
    /// Serialized as the bare scheme string.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.serialize_str(&self.0);
    }
}

/// Characters that must be escaped inside a segment name of `kind`.
const fn escaped_chars(kind: EntityType) -> &'static [char] {
    return match kind {
        EntityType::Attachment | EntityType::PageAttachment => &['\\', '@'],
        EntityType::Document | EntityType::Space => &['\\', '.', ':', '@'],
        EntityType::Page => &['\\', '/', ':', '@'],
        EntityType::Wiki => &['\\', ':'],
    };
}

/// Escape separator characters in a segment name.
fn escape_name(name: &str, kind: EntityType) -> Cow<'_, str> {
    let special = escaped_chars(kind);
    if !name.contains(special) {
        return Cow::Borrowed(name);
    }
    let mut out = String::with_capacity(name.len().saturating_add(4));
    for ch in name.chars() {
        if special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    return Cow::Owned(out);
}

/// Separator written between a parent segment and its child.
const fn separator_between(parent: EntityType, child: EntityType) -> char {
    return match (parent, child) {
        (EntityType::Wiki, _) => ':',
        (_, EntityType::Attachment | EntityType::PageAttachment) => '@',
        (EntityType::Page, _) => '/',
        _ => '.',
    };
}
