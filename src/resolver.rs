//! Level-filling resolution of parsed chains against a base reference.
//!
//! A reference is viewed as up to four levels (wiki, container path,
//! document, attachment). The topmost level the author wrote explicitly
//! splits them: everything above it is inherited from the base, everything
//! at or below it comes from the reference itself, and empty leaves take the
//! default name of their kind.

use crate::context::ModelDefaults;
use crate::convert;
use crate::types::{EntityReference, EntityType};

/// Resolver family: how far a partial reference is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Always completes to a wiki-rooted chain, using defaults where the
    /// base has nothing to offer.
    Absolute,
    /// Completes only from the base; the result stays relative unless a
    /// wiki segment is present in the reference or its base.
    Relative,
}

/// One level of a reference; `depth` orders them outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    /// Attachment name.
    Attachment,
    /// Space path, or page path for the page family.
    Containers,
    /// Document name.
    Document,
    /// Wiki name.
    Wiki,
}

/// A chain broken into independently inherited levels.
#[derive(Debug, Default, Clone)]
struct Levels {
    /// Attachment or page-attachment name.
    attachment: Option<String>,
    /// Space or page names, outermost first.
    containers: Vec<String>,
    /// Document name.
    document: Option<String>,
    /// Wiki name.
    wiki: Option<String>,
}

impl Family {
    /// Pick a leaf name, substituting the default where the family allows it.
    fn leaf(self, name: Option<&str>, from_partial: bool, default: &str) -> Option<String> {
        return match name {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ if from_partial || self == Self::Absolute => Some(default.to_string()),
            _ => None,
        };
    }

    /// Resolve `partial` to a reference of kind `target` using this family's rules.
    pub fn resolve(
        self,
        partial: &EntityReference,
        target: EntityType,
        base: Option<&EntityReference>,
        defaults: &ModelDefaults,
    ) -> EntityReference {
        let wanted = levels_for(target);
        let own = Levels::of(partial);
        let inherited = base
            .and_then(|b| return comparable_base(b, target, defaults))
            .map(|b| return Levels::of(&b))
            .unwrap_or_default();
        let topmost = wanted.iter().copied().find(|level| return own.is_explicit(*level));

        let mut out = Levels::default();
        for &level in wanted {
            let from_partial = topmost.is_some_and(|top| return level.depth() >= top.depth());
            let source = if from_partial { &own } else { &inherited };
            match level {
                Level::Attachment => {
                    out.attachment = self.leaf(source.attachment.as_deref(), from_partial, &defaults.attachment);
                },
                Level::Containers => {
                    out.containers = if from_partial {
                        expand_leading_inherit(&own.containers, &inherited.containers)
                    } else {
                        inherited.containers.clone()
                    };
                    if out.containers.is_empty() && self == Self::Absolute {
                        out.containers.push(defaults.space.clone());
                    }
                },
                Level::Document => {
                    out.document = self.leaf(source.document.as_deref(), from_partial, &defaults.document);
                },
                Level::Wiki => {
                    out.wiki = source.wiki.clone().filter(|w| return !w.is_empty());
                    if out.wiki.is_none() && self == Self::Absolute {
                        out.wiki = Some(defaults.wiki.clone());
                    }
                },
            }
        }

        return out.build(target).unwrap_or_else(|| return partial.clone());
    }
}

impl Level {
    /// Nesting depth, the wiki being outermost.
    const fn depth(self) -> u8 {
        return match self {
            Self::Attachment => 3,
            Self::Containers => 1,
            Self::Document => 2,
            Self::Wiki => 0,
        };
    }
}

impl Levels {
    /// Assemble the chain, keeping only the innermost contiguous run of
    /// validly nested segments.
    fn build(self, target: EntityType) -> Option<EntityReference> {
        let wanted = levels_for(target);
        let page_family = target.is_page_family();
        let mut segments: Vec<(EntityType, String)> = Vec::new();

        if let Some(wiki) = self.wiki {
            segments.push((EntityType::Wiki, wiki));
        }
        let container_kind = if page_family { EntityType::Page } else { EntityType::Space };
        for name in self.containers {
            segments.push((container_kind, name));
        }
        if wanted.contains(&Level::Document)
            && let Some(document) = self.document
        {
            segments.push((EntityType::Document, document));
        }
        if wanted.contains(&Level::Attachment)
            && let Some(attachment) = self.attachment
        {
            let kind = if page_family { EntityType::PageAttachment } else { EntityType::Attachment };
            segments.push((kind, attachment));
        }

        let start = segments
            .windows(2)
            .rposition(|pair| {
                return match pair {
                    [(parent, _), (child, _)] => !child.accepts_parent(Some(*parent)),
                    _ => false,
                };
            })
            .map_or(0, |index| return index.saturating_add(1));
        return EntityReference::from_segments(segments.into_iter().skip(start));
    }

    /// Whether the author named `level` with a non-empty value.
    fn is_explicit(&self, level: Level) -> bool {
        return match level {
            Level::Attachment => self.attachment.as_deref().is_some_and(|n| return !n.is_empty()),
            Level::Containers => !self.containers.is_empty(),
            Level::Document => self.document.as_deref().is_some_and(|n| return !n.is_empty()),
            Level::Wiki => self.wiki.as_deref().is_some_and(|n| return !n.is_empty()),
        };
    }

    /// Split a chain into its levels.
    fn of(reference: &EntityReference) -> Self {
        let mut levels = Self::default();
        for segment in reference.chain() {
            let name = segment.name().to_string();
            match segment.kind() {
                EntityType::Attachment | EntityType::PageAttachment => levels.attachment = Some(name),
                EntityType::Document => levels.document = Some(name),
                EntityType::Page | EntityType::Space => levels.containers.push(name),
                EntityType::Wiki => levels.wiki = Some(name),
            }
        }
        return levels;
    }
}

/// Bring the base into the same family (space/document vs. page) as the target.
fn comparable_base(
    base: &EntityReference,
    target: EntityType,
    defaults: &ModelDefaults,
) -> Option<EntityReference> {
    let base_kind = base.kind();
    if base_kind == EntityType::Wiki || base_kind.is_page_family() == target.is_page_family() {
        return Some(base.clone());
    }
    let family_root = if target.is_page_family() { EntityType::Page } else { EntityType::Document };
    return convert::convert(base, family_root, defaults);
}

/// A leading empty container means "the base's containers", with the rest
/// of the written path nested below them.
fn expand_leading_inherit(own: &[String], inherited: &[String]) -> Vec<String> {
    return match own.split_first() {
        Some((first, rest)) if first.is_empty() => {
            inherited.iter().chain(rest.iter()).cloned().collect()
        },
        _ => own.to_vec(),
    };
}

/// Levels making up a reference of kind `target`, outermost first.
const fn levels_for(target: EntityType) -> &'static [Level] {
    return match target {
        EntityType::Attachment => &[Level::Wiki, Level::Containers, Level::Document, Level::Attachment],
        EntityType::Document => &[Level::Wiki, Level::Containers, Level::Document],
        EntityType::Page | EntityType::Space => &[Level::Wiki, Level::Containers],
        EntityType::PageAttachment => &[Level::Wiki, Level::Containers, Level::Attachment],
        EntityType::Wiki => &[Level::Wiki],
    };
}

/// Absolute ("current") resolution: the result is always wiki-rooted.
pub fn resolve_current(
    partial: &EntityReference,
    target: EntityType,
    base: Option<&EntityReference>,
    defaults: &ModelDefaults,
) -> EntityReference {
    return Family::Absolute.resolve(partial, target, base, defaults);
}

/// Relative resolution: only what the base provides is filled in.
pub fn resolve_relative(
    partial: &EntityReference,
    target: EntityType,
    base: Option<&EntityReference>,
    defaults: &ModelDefaults,
) -> EntityReference {
    return Family::Relative.resolve(partial, target, base, defaults);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn current(raw: &str, target: EntityType, base: Option<&str>) -> String {
        let defaults = ModelDefaults::default();
        let base = base.map(|b| return resolve_current(&parse(b, EntityType::Document), EntityType::Document, None, &defaults));
        return resolve_current(&parse(raw, target), target, base.as_ref(), &defaults).to_string();
    }

    fn relative(raw: &str, target: EntityType, base: Option<&str>) -> EntityReference {
        let defaults = ModelDefaults::default();
        let base = base.map(|b| return parse(b, EntityType::Document));
        return resolve_relative(&parse(raw, target), target, base.as_ref(), &defaults);
    }

    #[test]
    fn bare_name_inherits_wiki_and_spaces() {
        assert_eq!(current("Foo", EntityType::Document, Some("xwiki:Space.WebHome")), "xwiki:Space.Foo");
    }

    #[test]
    fn qualified_name_inherits_only_the_wiki() {
        assert_eq!(current("Other.Page", EntityType::Document, Some("dev:Space.WebHome")), "dev:Other.Page");
    }

    #[test]
    fn explicit_space_without_document_is_the_home_page() {
        assert_eq!(current("Space.", EntityType::Document, Some("xwiki:A.B")), "xwiki:Space.WebHome");
        assert_eq!(current("wiki:space.", EntityType::Document, None), "wiki:space.WebHome");
    }

    #[test]
    fn leading_separator_stays_in_the_current_space() {
        assert_eq!(current(".Foo", EntityType::Document, Some("xwiki:A.B.Page")), "xwiki:A.B.Foo");
        assert_eq!(current(".", EntityType::Document, Some("xwiki:A.B.Page")), "xwiki:A.B.WebHome");
        assert_eq!(current(".C.Foo", EntityType::Document, Some("xwiki:A.Page")), "xwiki:A.C.Foo");
    }

    #[test]
    fn empty_reference_is_the_base() {
        assert_eq!(current("", EntityType::Document, Some("xwiki:A.Page")), "xwiki:A.Page");
        assert_eq!(current("", EntityType::Document, None), "xwiki:Main.WebHome");
    }

    #[test]
    fn explicit_wiki_wins() {
        assert_eq!(current("dev:S.P", EntityType::Document, Some("xwiki:A.Page")), "dev:S.P");
    }

    #[test]
    fn interior_empty_space_is_literal() {
        assert_eq!(current("Space..Page", EntityType::Document, None), "xwiki:Space..Page");
    }

    #[test]
    fn attachments_inherit_their_document() {
        assert_eq!(current("f.png", EntityType::Attachment, Some("xwiki:S.Page")), "xwiki:S.Page@f.png");
        assert_eq!(current("Other@f.png", EntityType::Attachment, Some("xwiki:S.Page")), "xwiki:S.Other@f.png");
        assert_eq!(current("", EntityType::Attachment, None), "xwiki:Main.WebHome@filename");
    }

    #[test]
    fn spaces_resolve_against_a_document_base() {
        assert_eq!(current("Sub", EntityType::Space, Some("xwiki:A.Page")), "xwiki:Sub");
        assert_eq!(current(".Sub", EntityType::Space, Some("xwiki:A.Page")), "xwiki:A.Sub");
        assert_eq!(current("", EntityType::Space, Some("xwiki:A.Page")), "xwiki:A");
    }

    #[test]
    fn pages_convert_a_document_base() {
        assert_eq!(current("A/B", EntityType::Page, Some("dev:S.Page")), "dev:A/B");
        assert_eq!(
            current("f.txt", EntityType::PageAttachment, Some("xwiki:S.Page")),
            "xwiki:S/Page@f.txt"
        );
        assert_eq!(
            current("f.txt", EntityType::PageAttachment, Some("xwiki:S.WebHome")),
            "xwiki:S@f.txt"
        );
    }

    #[test]
    fn relative_family_without_base_stays_relative() {
        let resolved = relative("Foo", EntityType::Document, None);
        assert_eq!(resolved.to_string(), "Foo");
        assert!(!resolved.is_absolute());
    }

    #[test]
    fn relative_family_fills_from_a_relative_base() {
        let resolved = relative("Foo", EntityType::Document, Some("Space.WebHome"));
        assert_eq!(resolved.to_string(), "Space.Foo");
        assert!(!resolved.is_absolute());
    }

    #[test]
    fn relative_family_becomes_absolute_with_a_wiki() {
        let resolved = relative("Foo", EntityType::Document, Some("dev:Space.WebHome"));
        assert_eq!(resolved.to_string(), "dev:Space.Foo");
        assert!(resolved.is_absolute());
    }

    #[test]
    fn relative_family_does_not_invent_a_document() {
        let defaults = ModelDefaults::default();
        let base = parse("Space", EntityType::Space);
        let resolved = resolve_relative(&parse("f.png", EntityType::Attachment), EntityType::Attachment, Some(&base), &defaults);
        assert_eq!(resolved.to_string(), "f.png");
    }
}
