//! Resolve context-sensitive wiki resource references into absolute entity
//! references.
//!
//! A reference such as `Foo`, `.Child`, `Other.Page@file.png` or
//! `dev:Space.Page` is parsed into a partial chain, anchored on a chain of
//! base references (or the current document), completed by a typed resolver
//! and, for untyped document and attachment links, checked against an
//! [`ExistenceOracle`] so that missing documents read as space home pages.

pub mod base;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod fallback;
pub mod oracle;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod scanner;
pub mod typed;
pub mod types;

pub use context::{ModelDefaults, ResolutionContext};
pub use error::Error;
pub use oracle::{ContentDirectory, DocumentSet, ExistenceOracle};
pub use registry::{ResolverRegistry, default_registry};
pub use typed::{Environment, TypedResolver};
pub use types::{EntityReference, EntityType, ResourceReference, ResourceType};

/// Resolve one raw reference with the built-in resolvers.
///
/// `declared` selects the resolver (`doc`, `relative/attach`, ...); `typed`
/// says whether the author wrote that type explicitly. Returns `None` for
/// unsupported schemes and when the result cannot be expressed as `target`.
///
/// # Errors
///
/// Returns `Error::KindMismatch` only if a resolver is registered under a
/// scheme other than its own.
pub fn resolve(
    raw: &str,
    declared: &ResourceType,
    typed: bool,
    base_references: &[String],
    target: EntityType,
    context: &ResolutionContext,
    oracle: &dyn ExistenceOracle,
) -> Result<Option<EntityReference>, Error> {
    let reference = ResourceReference {
        base_references: base_references.to_vec(),
        reference: raw.to_string(),
        resource_type: declared.clone(),
        typed,
    };
    let env = Environment::new(context, oracle);
    return default_registry().resolve(&reference, target, &env);
}
