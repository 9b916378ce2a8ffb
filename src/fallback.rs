//! Existence-based reinterpretation of untyped document references.
//!
//! A document that does not exist is read as the home page of a space with
//! the same name. A bare name written on a space home page may additionally
//! land in a sibling space, but only when that sibling is known to exist.
//! At most three oracle calls are made: the candidate, the space candidate
//! (only to decide sibling eligibility) and the sibling itself.

use tracing::debug;

use crate::oracle::{self, ExistenceOracle};
use crate::types::{EntityReference, EntityType};

/// Result of one step, tagged with whether the oracle confirmed it.
#[derive(Debug)]
enum Outcome {
    /// The oracle reported the document exists.
    Existing(EntityReference),
    /// Not confirmed; the space home page reading of a missing document.
    Reinterpreted(EntityReference),
}

/// Inputs that stay fixed across the recursive step.
struct Fallback<'a> {
    /// Anchor the candidate was resolved against.
    base: Option<&'a EntityReference>,
    /// Home page name.
    home: &'a str,
    /// Existence predicate.
    oracle: &'a dyn ExistenceOracle,
    /// The reference as written, before any base was applied.
    source: &'a EntityReference,
}

impl Outcome {
    /// The reference, whether confirmed or not.
    fn into_reference(self) -> EntityReference {
        return match self {
            Self::Existing(reference) | Self::Reinterpreted(reference) => reference,
        };
    }
}

impl Fallback<'_> {
    /// Keep `candidate` if it exists, else read it as a space home page and,
    /// when `try_sibling` allows, look for that space next to the base's.
    fn resolve(&self, candidate: EntityReference, try_sibling: bool) -> Outcome {
        if oracle::document_exists(self.oracle, &candidate) {
            return Outcome::Existing(candidate);
        }

        let Some(space_candidate) = space_home_page(&candidate, self.home) else {
            return Outcome::Reinterpreted(candidate);
        };
        if !try_sibling || !self.sibling_eligible(&space_candidate) {
            debug!(%candidate, reinterpreted = %space_candidate, "document missing, using space home page");
            return Outcome::Reinterpreted(space_candidate);
        }

        let Some(sibling) = sibling_home_page(&space_candidate, self.home) else {
            return Outcome::Reinterpreted(space_candidate);
        };
        return match self.resolve(sibling, false) {
            Outcome::Existing(sibling) => {
                debug!(%candidate, %sibling, "using sibling space home page");
                Outcome::Existing(sibling)
            },
            Outcome::Reinterpreted(_) => {
                debug!(%candidate, reinterpreted = %space_candidate, "sibling space missing, using nested space home page");
                Outcome::Reinterpreted(space_candidate)
            },
        };
    }

    /// A bare name on a home page whose nested space reading does not exist.
    /// The oracle is asked last.
    fn sibling_eligible(&self, space_candidate: &EntityReference) -> bool {
        return !self.source.has_parent()
            && self.base.is_some_and(|base| return base.is_home_page(self.home))
            && !oracle::document_exists(self.oracle, space_candidate);
    }
}

/// Apply existence fallback to `candidate`, the absolute document that
/// `source` resolved to against `base`.
///
/// References to the base itself, to a home page, or that are not absolute
/// documents are returned unchanged without consulting the oracle, as are
/// sources that name their wiki explicitly.
pub fn resolve_document(
    source: &EntityReference,
    candidate: EntityReference,
    base: Option<&EntityReference>,
    oracle: &dyn ExistenceOracle,
    home: &str,
) -> EntityReference {
    if base == Some(&candidate)
        || source.is_absolute()
        || candidate.kind() != EntityType::Document
        || !candidate.is_absolute()
        || candidate.is_home_page(home)
    {
        return candidate;
    }

    let fallback = Fallback {
        base,
        home,
        oracle,
        source,
    };
    return fallback.resolve(candidate, true).into_reference();
}

/// Home page of the space named after `document`, nested where the
/// document was. `None` when the document's parent cannot hold a space.
pub(crate) fn space_home_page(document: &EntityReference, home: &str) -> Option<EntityReference> {
    let space = document.parent().map_or_else(
        || return Some(EntityReference::new(EntityType::Space, document.name())),
        |parent| return parent.child(EntityType::Space, document.name()),
    )?;
    return space.child(EntityType::Document, home);
}

/// Home page of the same-named space one level up from `space_home`'s space.
fn sibling_home_page(space_home: &EntityReference, home: &str) -> Option<EntityReference> {
    let space = space_home.parent()?;
    let grandparent = space.parent()?.parent()?;
    return grandparent
        .child(EntityType::Space, space.name())?
        .child(EntityType::Document, home);
}
