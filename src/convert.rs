//! Structural conversion between entity kinds: drop or extend trailing
//! segments, never consult the existence oracle.

use crate::context::ModelDefaults;
use crate::types::{EntityReference, EntityType};

/// Nearest reference of kind `target` to `reference`.
///
/// Returns `None` when the chain lacks the level the target needs
/// (e.g. asking a relative document for its wiki).
pub fn convert(
    reference: &EntityReference,
    target: EntityType,
    defaults: &ModelDefaults,
) -> Option<EntityReference> {
    if reference.kind() == target {
        return Some(reference.clone());
    }

    return match target {
        EntityType::Attachment => match reference.kind() {
            EntityType::PageAttachment => to_document(reference.parent()?, defaults)?
                .child(EntityType::Attachment, reference.name()),
            _ => to_document(reference, defaults)?.child(EntityType::Attachment, defaults.attachment.as_str()),
        },
        EntityType::Document => to_document(reference, defaults),
        EntityType::Page => to_page(reference, defaults),
        EntityType::PageAttachment => match reference.kind() {
            EntityType::Attachment => to_page(reference.parent()?, defaults)?
                .child(EntityType::PageAttachment, reference.name()),
            _ => to_page(reference, defaults)?.child(EntityType::PageAttachment, defaults.attachment.as_str()),
        },
        EntityType::Space => to_space(reference, defaults),
        EntityType::Wiki => reference.extract(EntityType::Wiki).cloned(),
    };
}

/// Reinterpret a page chain as the equivalent space chain.
fn page_to_space(page: &EntityReference) -> Option<EntityReference> {
    let wiki = page
        .extract(EntityType::Wiki)
        .map(|w| return (EntityType::Wiki, w.name().to_string()));
    let spaces = page
        .names_of(EntityType::Page)
        .into_iter()
        .map(|name| return (EntityType::Space, name.to_string()));
    return EntityReference::from_segments(wiki.into_iter().chain(spaces));
}

/// Owning document, or the home page of a space/wiki/page.
fn to_document(reference: &EntityReference, defaults: &ModelDefaults) -> Option<EntityReference> {
    let home = defaults.document.as_str();
    return match reference.kind() {
        EntityType::Attachment => reference.parent().cloned(),
        EntityType::Document => Some(reference.clone()),
        EntityType::Page => page_to_space(reference)?.child(EntityType::Document, home),
        EntityType::PageAttachment => to_document(reference.parent()?, defaults),
        EntityType::Space => reference.child(EntityType::Document, home),
        EntityType::Wiki => reference
            .child(EntityType::Space, defaults.space.as_str())?
            .child(EntityType::Document, home),
    };
}

/// A document becomes the page path of its spaces, plus its own name
/// unless it is a space home page.
fn to_page(reference: &EntityReference, defaults: &ModelDefaults) -> Option<EntityReference> {
    return match reference.kind() {
        EntityType::Page => Some(reference.clone()),
        EntityType::PageAttachment => reference.parent().cloned(),
        EntityType::Wiki => reference.child(EntityType::Page, defaults.space.as_str()),
        EntityType::Attachment | EntityType::Document | EntityType::Space => {
            let document = to_document(reference, defaults)?;
            let wiki = document
                .extract(EntityType::Wiki)
                .map(|w| return (EntityType::Wiki, w.name().to_string()));
            let mut pages: Vec<String> = document
                .names_of(EntityType::Space)
                .into_iter()
                .map(str::to_string)
                .collect();
            if !document.is_home_page(&defaults.document) {
                pages.push(document.name().to_string());
            }
            EntityReference::from_segments(
                wiki.into_iter()
                    .chain(pages.into_iter().map(|name| return (EntityType::Page, name))),
            )
        },
    };
}

/// Enclosing space, or the default space of a wiki.
fn to_space(reference: &EntityReference, defaults: &ModelDefaults) -> Option<EntityReference> {
    return match reference.kind() {
        EntityType::Page | EntityType::PageAttachment => page_to_space(reference.extract(EntityType::Page)?),
        EntityType::Wiki => reference.child(EntityType::Space, defaults.space.as_str()),
        _ => reference.extract(EntityType::Space).cloned(),
    };
}
