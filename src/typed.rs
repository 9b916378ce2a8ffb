//! Typed resolvers: one per resource type, each in an absolute and a
//! relative family.
//!
//! Resolvers are stateless after construction. Shared behavior (kind
//! checking, base folding, conversion to the requested kind) lives in the
//! provided [`TypedResolver::resolve`] method; document and attachment
//! resolvers override the untyped branch to apply existence fallback.

use crate::base;
use crate::context::ResolutionContext;
use crate::convert;
use crate::error::Error;
use crate::fallback;
use crate::oracle::{self, ExistenceOracle};
use crate::parser;
use crate::resolver::Family;
use crate::types::{EntityReference, EntityType, ResourceReference, ResourceType};

/// Resolves `attach` references. Untyped references whose owning document is
/// missing are moved onto the home page of the same-named space.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentResolver {
    /// Completion rules.
    family: Family,
}

/// Resolves `doc` references. Untyped references go through existence fallback.
#[derive(Debug, Clone, Copy)]
pub struct DocumentResolver {
    /// Completion rules.
    family: Family,
}

/// What a resolver may consult besides the reference itself.
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    /// Current document and default names.
    pub context: &'a ResolutionContext,
    /// Existence predicate for untyped fallback.
    pub oracle: &'a dyn ExistenceOracle,
}

/// Resolves `pageAttach` references. No fallback.
#[derive(Debug, Clone, Copy)]
pub struct PageAttachmentResolver {
    /// Completion rules.
    family: Family,
}

/// Resolves `page` references. No fallback.
#[derive(Debug, Clone, Copy)]
pub struct PageResolver {
    /// Completion rules.
    family: Family,
}

/// Resolves `space` references. No fallback.
#[derive(Debug, Clone, Copy)]
pub struct SpaceResolver {
    /// Completion rules.
    family: Family,
}

/// A resolver bound to one resource type.
pub trait TypedResolver: Send + Sync {
    /// Absolute or relative completion.
    fn family(&self) -> Family;

    /// Entity kind this resolver produces before any conversion.
    fn output_type(&self) -> EntityType;

    /// Resolve `reference` to a reference of kind `target`.
    ///
    /// Bases are folded in order, starting from the current document for the
    /// absolute family and from nothing for the relative family. Returns
    /// `None` when the result cannot be converted to `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KindMismatch` if the reference declares a resource
    /// type other than this resolver's.
    fn resolve(
        &self,
        reference: &ResourceReference,
        target: EntityType,
        env: &Environment<'_>,
    ) -> Result<Option<EntityReference>, Error> {
        let expected = self.resource_type();
        if reference.resource_type.absolute() != expected {
            return Err(Error::KindMismatch {
                actual: reference.resource_type.clone(),
                expected,
            });
        }

        let defaults = env.context.defaults();
        let family = self.family();
        let seed = match family {
            Family::Absolute => Some(env.context.current()),
            Family::Relative => None,
        };
        let base_kind = if self.output_type().is_page_family() {
            EntityType::Page
        } else {
            EntityType::Document
        };
        let base = base::fold_bases(&reference.base_references, seed, base_kind, family, defaults);

        let resolved = if reference.typed {
            self.resolve_typed(&reference.reference, base.as_ref(), env)
        } else {
            self.resolve_untyped(&reference.reference, base.as_ref(), env)
        };
        if resolved.kind() == target {
            return Ok(Some(resolved));
        }
        return Ok(convert::convert(&resolved, target, defaults));
    }

    /// Resolve a reference whose type was written explicitly. Never
    /// consults the oracle.
    fn resolve_typed(&self, reference: &str, base: Option<&EntityReference>, env: &Environment<'_>) -> EntityReference {
        let kind = self.output_type();
        return self
            .family()
            .resolve(&parser::parse(reference, kind), kind, base, env.context.defaults());
    }

    /// Resolve a reference whose type was inferred. Same as typed unless the
    /// resolver defines a fallback.
    fn resolve_untyped(&self, reference: &str, base: Option<&EntityReference>, env: &Environment<'_>) -> EntityReference {
        return self.resolve_typed(reference, base, env);
    }

    /// Resource type (absolute scheme) this resolver accepts.
    fn resource_type(&self) -> ResourceType;
}

impl AttachmentResolver {
    /// Wiki-rooted results.
    pub const fn absolute() -> Self {
        return Self {
            family: Family::Absolute,
        };
    }

    /// Results completed only from the bases.
    pub const fn relative() -> Self {
        return Self {
            family: Family::Relative,
        };
    }
}

impl TypedResolver for AttachmentResolver {
    fn family(&self) -> Family {
        return self.family;
    }

    fn output_type(&self) -> EntityType {
        return EntityType::Attachment;
    }

    /// Move the attachment onto a space home page when its owning document is
    /// missing, unless the owner is already a home page or is the base's document.
    fn resolve_untyped(&self, reference: &str, base: Option<&EntityReference>, env: &Environment<'_>) -> EntityReference {
        let partial = parser::parse(reference, EntityType::Attachment);
        let candidate = self.resolve_typed(reference, base, env);
        if partial.is_absolute() || !candidate.is_absolute() {
            return candidate;
        }
        let Some(owner) = candidate.parent().filter(|p| return p.kind() == EntityType::Document) else {
            return candidate;
        };

        let defaults = env.context.defaults();
        let base_document = base.and_then(|b| return convert::convert(b, EntityType::Document, defaults));
        if owner.is_home_page(&defaults.document) || base_document.as_ref() == Some(owner) {
            return candidate;
        }
        if oracle::document_exists(env.oracle, owner) {
            return candidate;
        }

        let Some(moved) = fallback::space_home_page(owner, &defaults.document)
            .and_then(|home| return home.child(EntityType::Attachment, candidate.name()))
        else {
            return candidate;
        };
        tracing::debug!(%candidate, %moved, "attachment owner missing, using space home page");
        return moved;
    }

    fn resource_type(&self) -> ResourceType {
        return ResourceType::ATTACHMENT;
    }
}

impl DocumentResolver {
    /// Wiki-rooted results.
    pub const fn absolute() -> Self {
        return Self {
            family: Family::Absolute,
        };
    }

    /// Results completed only from the bases.
    pub const fn relative() -> Self {
        return Self {
            family: Family::Relative,
        };
    }
}

impl TypedResolver for DocumentResolver {
    fn family(&self) -> Family {
        return self.family;
    }

    fn output_type(&self) -> EntityType {
        return EntityType::Document;
    }

    fn resolve_untyped(&self, reference: &str, base: Option<&EntityReference>, env: &Environment<'_>) -> EntityReference {
        let partial = parser::parse(reference, EntityType::Document);
        let defaults = env.context.defaults();
        let candidate = self.family.resolve(&partial, EntityType::Document, base, defaults);
        return fallback::resolve_document(&partial, candidate, base, env.oracle, &defaults.document);
    }

    fn resource_type(&self) -> ResourceType {
        return ResourceType::DOCUMENT;
    }
}

impl<'a> Environment<'a> {
    /// Bundle a context and an oracle.
    pub const fn new(context: &'a ResolutionContext, oracle: &'a dyn ExistenceOracle) -> Self {
        return Self { context, oracle };
    }
}

impl PageAttachmentResolver {
    /// Wiki-rooted results.
    pub const fn absolute() -> Self {
        return Self {
            family: Family::Absolute,
        };
    }

    /// Results completed only from the bases.
    pub const fn relative() -> Self {
        return Self {
            family: Family::Relative,
        };
    }
}

impl TypedResolver for PageAttachmentResolver {
    fn family(&self) -> Family {
        return self.family;
    }

    fn output_type(&self) -> EntityType {
        return EntityType::PageAttachment;
    }

    fn resource_type(&self) -> ResourceType {
        return ResourceType::PAGE_ATTACHMENT;
    }
}

impl PageResolver {
    /// Wiki-rooted results.
    pub const fn absolute() -> Self {
        return Self {
            family: Family::Absolute,
        };
    }

    /// Results completed only from the bases.
    pub const fn relative() -> Self {
        return Self {
            family: Family::Relative,
        };
    }
}

impl TypedResolver for PageResolver {
    fn family(&self) -> Family {
        return self.family;
    }

    fn output_type(&self) -> EntityType {
        return EntityType::Page;
    }

    fn resource_type(&self) -> ResourceType {
        return ResourceType::PAGE;
    }
}

impl SpaceResolver {
    /// Wiki-rooted results.
    pub const fn absolute() -> Self {
        return Self {
            family: Family::Absolute,
        };
    }

    /// Results completed only from the bases.
    pub const fn relative() -> Self {
        return Self {
            family: Family::Relative,
        };
    }
}

impl TypedResolver for SpaceResolver {
    fn family(&self) -> Family {
        return self.family;
    }

    fn output_type(&self) -> EntityType {
        return EntityType::Space;
    }

    fn resource_type(&self) -> ResourceType {
        return ResourceType::SPACE;
    }
}
