//! Relative reference parsing: raw author strings into partial entity chains.
//!
//! Parsing never fails. Separators are located right to left so that a bare
//! word is always the innermost kind requested, and anything the author left
//! out is simply absent from the chain, to be inherited during resolution.

use crate::types::{EntityReference, EntityType};

/// Separates a document (or page) from its attachment name.
const ATTACHMENT_SEPARATOR: char = '@';

/// Escapes the following character.
const ESCAPE: char = '\\';

/// Separates nested pages.
const PAGE_SEPARATOR: char = '/';

/// Separates spaces from each other and from the document name.
const SPACE_SEPARATOR: char = '.';

/// Separates the wiki from the rest of the reference.
const WIKI_SEPARATOR: char = ':';

/// Parse `raw` into a relative chain whose innermost segment has kind `kind`.
///
/// A leading separator (`.Page`) yields an empty-name parent segment, which
/// resolution reads as "the base's chain"; consecutive separators yield
/// literal empty-name segments.
pub fn parse(raw: &str, kind: EntityType) -> EntityReference {
    let parsed = match kind {
        EntityType::Attachment => parse_attachment(raw),
        EntityType::Document => parse_document(raw),
        EntityType::Page => parse_pages(raw),
        EntityType::PageAttachment => parse_page_attachment(raw),
        EntityType::Space => parse_spaces(raw),
        EntityType::Wiki => Some(EntityReference::new(EntityType::Wiki, unescape(raw))),
    };
    // Helpers nest kinds in hierarchy order only; the raw text as one name is the floor.
    return parsed.unwrap_or_else(|| return EntityReference::new(kind, unescape(raw)));
}

/// Parse a nested-container path (`wiki:a.b` or `wiki:a/b`), where the wiki
/// is whatever precedes the last unescaped wiki separator.
fn parse_container_path(raw: &str, kind: EntityType, separator: char) -> Option<EntityReference> {
    let (wiki, path) = match rsplit_unescaped(raw, WIKI_SEPARATOR) {
        Some((wiki, path)) => (Some(wiki), path),
        None => (None, raw),
    };

    let mut names = split_unescaped(path, separator).into_iter();
    let first = unescape(names.next().unwrap_or(""));
    let mut chain = match wiki {
        Some(wiki) => EntityReference::new(EntityType::Wiki, unescape(wiki)).child(kind, first)?,
        None => EntityReference::new(kind, first),
    };
    for name in names {
        chain = chain.child(kind, unescape(name))?;
    }
    return Some(chain);
}

/// `[document@]attachment`
fn parse_attachment(raw: &str) -> Option<EntityReference> {
    return match rsplit_unescaped(raw, ATTACHMENT_SEPARATOR) {
        Some(("", name)) => Some(EntityReference::new(EntityType::Attachment, unescape(name))),
        Some((document, name)) => parse_document(document)?.child(EntityType::Attachment, unescape(name)),
        None => Some(EntityReference::new(EntityType::Attachment, unescape(raw))),
    };
}

/// `[wiki:]space[.space...].document`
fn parse_document(raw: &str) -> Option<EntityReference> {
    return match rsplit_unescaped(raw, SPACE_SEPARATOR) {
        Some((spaces, name)) => parse_spaces(spaces)?.child(EntityType::Document, unescape(name)),
        None => Some(EntityReference::new(EntityType::Document, unescape(raw))),
    };
}

/// `[page@]attachment`
fn parse_page_attachment(raw: &str) -> Option<EntityReference> {
    return match rsplit_unescaped(raw, ATTACHMENT_SEPARATOR) {
        Some(("", name)) => Some(EntityReference::new(EntityType::PageAttachment, unescape(name))),
        Some((page, name)) => parse_pages(page)?.child(EntityType::PageAttachment, unescape(name)),
        None => Some(EntityReference::new(EntityType::PageAttachment, unescape(raw))),
    };
}

/// `[wiki:]page[/page...]`
fn parse_pages(raw: &str) -> Option<EntityReference> {
    return parse_container_path(raw, EntityType::Page, PAGE_SEPARATOR);
}

/// `[wiki:]space[.space...]`
fn parse_spaces(raw: &str) -> Option<EntityReference> {
    return parse_container_path(raw, EntityType::Space, SPACE_SEPARATOR);
}

/// Byte offsets of every unescaped occurrence of `separator`.
fn unescaped_positions(raw: &str, separator: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;
    for (index, ch) in raw.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == ESCAPE {
            escaped = true;
        } else if ch == separator {
            positions.push(index);
        }
    }
    return positions;
}

/// Split around the last unescaped `separator`.
fn rsplit_unescaped(raw: &str, separator: char) -> Option<(&str, &str)> {
    let position = *unescaped_positions(raw, separator).last()?;
    let (head, tail) = raw.split_at(position);
    return Some((head, tail.get(separator.len_utf8()..).unwrap_or("")));
}

/// Split on every unescaped `separator`. Always yields at least one piece.
fn split_unescaped(raw: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0_usize;
    for position in unescaped_positions(raw, separator) {
        pieces.push(raw.get(start..position).unwrap_or(""));
        start = position.saturating_add(separator.len_utf8());
    }
    pieces.push(raw.get(start..).unwrap_or(""));
    return pieces;
}

/// Drop escape characters, keeping the character each one protects.
/// A trailing lone escape is kept literally.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == ESCAPE {
            out.push(chars.next().unwrap_or(ESCAPE));
        } else {
            out.push(ch);
        }
    }
    return out;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root-first `(kind, name)` view of a chain, for compact assertions.
    fn segments(reference: &EntityReference) -> Vec<(EntityType, String)> {
        return reference
            .chain()
            .into_iter()
            .map(|r| return (r.kind(), r.name().to_string()))
            .collect();
    }

    #[test]
    fn full_document_reference() {
        let parsed = parse("wiki:space.page", EntityType::Document);
        assert_eq!(parsed.to_string(), "wiki:space.page");
        assert!(parsed.is_absolute());
    }

    #[test]
    fn bare_word_is_a_document_without_parent() {
        let parsed = parse("page", EntityType::Document);
        assert_eq!(segments(&parsed), vec![(EntityType::Document, "page".to_string())]);
        assert!(!parsed.has_parent());
    }

    #[test]
    fn wiki_separator_without_space_stays_in_the_name() {
        let parsed = parse("wiki:page", EntityType::Document);
        assert_eq!(parsed.name(), "wiki:page");
        assert!(!parsed.has_parent());
    }

    #[test]
    fn wiki_is_everything_before_the_last_colon() {
        let parsed = parse("wiki1.wiki2:wiki3:some.space.page", EntityType::Document);
        assert_eq!(parsed.extract(EntityType::Wiki).unwrap().name(), "wiki1.wiki2:wiki3");
        assert_eq!(parsed.names_of(EntityType::Space), vec!["some", "space"]);
        assert_eq!(parsed.name(), "page");
    }

    #[test]
    fn trailing_separator_leaves_an_empty_document() {
        let parsed = parse("space.", EntityType::Document);
        assert_eq!(
            segments(&parsed),
            vec![(EntityType::Space, "space".to_string()), (EntityType::Document, String::new())]
        );
    }

    #[test]
    fn leading_separator_keeps_an_empty_parent() {
        let parsed = parse(".Sibling", EntityType::Document);
        assert!(parsed.has_parent());
        assert_eq!(parsed.parent().unwrap().name(), "");
        assert_eq!(parsed.name(), "Sibling");
    }

    #[test]
    fn consecutive_separators_are_literal_empty_segments() {
        let parsed = parse("Space..Page", EntityType::Document);
        assert_eq!(parsed.names_of(EntityType::Space), vec!["Space", ""]);
        assert_eq!(parsed.name(), "Page");
    }

    #[test]
    fn escapes_protect_separators() {
        let parsed = parse(r"\\\.:@\.", EntityType::Document);
        assert_eq!(parsed.name(), r"\.:@.");
        assert!(!parsed.has_parent());

        let parsed = parse(r"some\.space.page", EntityType::Document);
        assert_eq!(parsed.names_of(EntityType::Space), vec!["some.space"]);

        let parsed = parse(r"\\:\\.\\", EntityType::Document);
        assert_eq!(parsed.extract(EntityType::Wiki).unwrap().name(), "\\");
        assert_eq!(parsed.names_of(EntityType::Space), vec!["\\"]);
        assert_eq!(parsed.name(), "\\");
    }

    #[test]
    fn attachment_splits_on_the_last_at_sign() {
        let parsed = parse("wiki:space.page@my.png", EntityType::Attachment);
        assert_eq!(parsed.name(), "my.png");
        assert_eq!(parsed.parent().unwrap().to_string(), "wiki:space.page");

        let bare = parse("some:file.name", EntityType::Attachment);
        assert_eq!(bare.name(), "some:file.name");
        assert!(!bare.has_parent());
    }

    #[test]
    fn attachment_with_empty_document_part_has_no_parent() {
        let parsed = parse("@file.txt", EntityType::Attachment);
        assert_eq!(parsed.name(), "file.txt");
        assert!(!parsed.has_parent());
    }

    #[test]
    fn space_reference_nests_spaces() {
        let parsed = parse("wiki:A.B", EntityType::Space);
        assert_eq!(parsed.to_string(), "wiki:A.B");
        assert_eq!(parsed.kind(), EntityType::Space);
    }

    #[test]
    fn page_references_use_slashes() {
        let parsed = parse("wiki:A/B/C", EntityType::Page);
        assert_eq!(parsed.names_of(EntityType::Page), vec!["A", "B", "C"]);

        let attachment = parse("A/B@doc.pdf", EntityType::PageAttachment);
        assert_eq!(attachment.name(), "doc.pdf");
        assert_eq!(attachment.parent().unwrap().names_of(EntityType::Page), vec!["A", "B"]);
    }

    #[test]
    fn empty_input_is_a_single_empty_segment() {
        let parsed = parse("", EntityType::Document);
        assert_eq!(segments(&parsed), vec![(EntityType::Document, String::new())]);
    }

    #[test]
    fn trailing_escape_is_literal() {
        assert_eq!(unescape("abc\\"), "abc\\");
    }
}
