//! Base-chain folding: resolve a list of base reference strings in order,
//! each anchored on the result of the previous one.

use crate::context::ModelDefaults;
use crate::parser;
use crate::resolver::Family;
use crate::types::{EntityReference, EntityType};

/// Fold `bases` left to right starting from `seed`.
///
/// Each base is parsed as `kind` and resolved by `family` against the
/// running result. Returns `None` only when there are no bases and no seed.
/// The fold is strictly sequential: base `n` depends on base `n - 1`.
pub fn fold_bases(
    bases: &[String],
    seed: Option<&EntityReference>,
    kind: EntityType,
    family: Family,
    defaults: &ModelDefaults,
) -> Option<EntityReference> {
    return bases.iter().fold(seed.cloned(), |anchor, raw| {
        let partial = parser::parse(raw, kind);
        return Some(family.resolve(&partial, kind, anchor.as_ref(), defaults));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bases(raw: &[&str]) -> Vec<String> {
        return raw.iter().map(|b| return (*b).to_string()).collect();
    }

    #[test]
    fn empty_bases_without_seed_is_none() {
        let defaults = ModelDefaults::default();
        assert!(fold_bases(&[], None, EntityType::Document, Family::Absolute, &defaults).is_none());
    }

    #[test]
    fn empty_bases_return_the_seed() {
        let defaults = ModelDefaults::default();
        let seed = EntityReference::document_at("xwiki", &["Main"], "Page").unwrap();
        let folded = fold_bases(&[], Some(&seed), EntityType::Document, Family::Absolute, &defaults);
        assert_eq!(folded, Some(seed));
    }

    #[test]
    fn later_bases_resolve_against_earlier_ones() {
        let defaults = ModelDefaults::default();
        let folded = fold_bases(
            &bases(&["dev:Outer.Page", "Inner.Page"]),
            None,
            EntityType::Document,
            Family::Absolute,
            &defaults,
        );
        assert_eq!(folded.unwrap().to_string(), "dev:Inner.Page");

        let reversed = fold_bases(
            &bases(&["Inner.Page", "dev:Outer.Page"]),
            None,
            EntityType::Document,
            Family::Absolute,
            &defaults,
        );
        assert_eq!(reversed.unwrap().to_string(), "dev:Outer.Page");
    }

    #[test]
    fn seed_anchors_the_first_base() {
        let defaults = ModelDefaults::default();
        let seed = EntityReference::document_at("dev", &["Sandbox"], "WebHome").unwrap();
        let folded = fold_bases(&bases(&["Child"]), Some(&seed), EntityType::Document, Family::Absolute, &defaults);
        assert_eq!(folded.unwrap().to_string(), "dev:Sandbox.Child");
    }

    #[test]
    fn relative_family_keeps_relative_bases_relative() {
        let defaults = ModelDefaults::default();
        let folded = fold_bases(&bases(&["Space.Page"]), None, EntityType::Document, Family::Relative, &defaults);
        let folded = folded.unwrap();
        assert_eq!(folded.to_string(), "Space.Page");
        assert!(!folded.is_absolute());
    }
}
