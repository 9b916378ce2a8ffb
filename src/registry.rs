//! Scheme-keyed dispatch to typed resolvers.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::Error;
use crate::typed::{
    AttachmentResolver, DocumentResolver, Environment, PageAttachmentResolver, PageResolver, SpaceResolver,
    TypedResolver,
};
use crate::types::{EntityReference, EntityType, ResourceReference, ResourceType};

/// Schemes recognized in link text that never resolve to a wiki entity.
const EXTERNAL_SCHEMES: &[&str] = &["data", "http", "https", "icon", "interwiki", "mailto", "path", "unc", "url", "user"];

/// Registry populated with every built-in resolver, shared read-only.
static DEFAULT_REGISTRY: LazyLock<ResolverRegistry> = LazyLock::new(ResolverRegistry::with_defaults);

/// Lookup table from scheme to resolver. Read-only once built.
#[derive(Default)]
pub struct ResolverRegistry {
    /// Resolvers keyed by scheme (`doc`, `relative/doc`, ...).
    resolvers: HashMap<String, Box<dyn TypedResolver>>,
}

impl ResolverRegistry {
    /// Resolver registered for `scheme`.
    pub fn get(&self, scheme: &ResourceType) -> Option<&dyn TypedResolver> {
        return self.resolvers.get(scheme.as_str()).map(|r| return r.as_ref());
    }

    /// Whether a resolver is registered for `scheme`.
    pub fn is_registered(&self, scheme: &str) -> bool {
        return self.resolvers.contains_key(scheme);
    }

    /// Read link text such as `attach:Page@f.png` or `Space.Page`.
    ///
    /// A `scheme:` prefix makes the reference typed only when the scheme is
    /// registered or external; otherwise the whole text is an untyped
    /// reference of `default_type` (so `wiki:Space.Page` stays a document).
    pub fn parse_link(&self, text: &str, default_type: &ResourceType) -> ResourceReference {
        if let Some((scheme, rest)) = text.split_once(':')
            && (self.is_registered(scheme) || EXTERNAL_SCHEMES.contains(&scheme))
        {
            return ResourceReference::typed(ResourceType::new(scheme), rest);
        }
        return ResourceReference::untyped(default_type.clone(), text);
    }

    /// Register `resolver` under `scheme`, replacing any previous one.
    pub fn register(&mut self, scheme: impl Into<String>, resolver: Box<dyn TypedResolver>) {
        let scheme = scheme.into();
        tracing::debug!(%scheme, "registered resolver");
        self.resolvers.insert(scheme, resolver);
    }

    /// Resolve `reference` with the resolver registered for its scheme.
    /// Unregistered schemes are unsupported and yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KindMismatch` if the registered resolver is bound to a
    /// different resource type.
    pub fn resolve(
        &self,
        reference: &ResourceReference,
        target: EntityType,
        env: &Environment<'_>,
    ) -> Result<Option<EntityReference>, Error> {
        let Some(resolver) = self.get(&reference.resource_type) else {
            tracing::debug!(scheme = %reference.resource_type, "no resolver registered");
            return Ok(None);
        };
        return resolver.resolve(reference, target, env);
    }

    /// Same as [`Self::resolve`], dispatching to the relative family
    /// registered under `relative/<scheme>`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KindMismatch` like [`Self::resolve`].
    pub fn resolve_relative(
        &self,
        reference: &ResourceReference,
        target: EntityType,
        env: &Environment<'_>,
    ) -> Result<Option<EntityReference>, Error> {
        let relative = ResourceReference {
            resource_type: reference.resource_type.relative(),
            ..reference.clone()
        };
        return self.resolve(&relative, target, env);
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        return schemes;
    }

    /// Registry holding the built-in resolvers under their absolute and
    /// `relative/` schemes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(ResourceType::ATTACHMENT.as_str(), Box::new(AttachmentResolver::absolute()));
        registry.register(ResourceType::ATTACHMENT.relative().as_str(), Box::new(AttachmentResolver::relative()));
        registry.register(ResourceType::DOCUMENT.as_str(), Box::new(DocumentResolver::absolute()));
        registry.register(ResourceType::DOCUMENT.relative().as_str(), Box::new(DocumentResolver::relative()));
        registry.register(ResourceType::PAGE.as_str(), Box::new(PageResolver::absolute()));
        registry.register(ResourceType::PAGE.relative().as_str(), Box::new(PageResolver::relative()));
        registry.register(ResourceType::PAGE_ATTACHMENT.as_str(), Box::new(PageAttachmentResolver::absolute()));
        registry.register(
            ResourceType::PAGE_ATTACHMENT.relative().as_str(),
            Box::new(PageAttachmentResolver::relative()),
        );
        registry.register(ResourceType::SPACE.as_str(), Box::new(SpaceResolver::absolute()));
        registry.register(ResourceType::SPACE.relative().as_str(), Box::new(SpaceResolver::relative()));
        return registry;
    }
}

/// The process-wide registry of built-in resolvers.
pub fn default_registry() -> &'static ResolverRegistry {
    return &DEFAULT_REGISTRY;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ModelDefaults, ResolutionContext};
    use crate::oracle::DocumentSet;

    #[test]
    fn builtin_schemes_are_registered_in_both_families() {
        let schemes = default_registry().schemes();
        assert!(schemes.contains(&"doc"));
        assert!(schemes.contains(&"relative/doc"));
        assert!(schemes.contains(&"relative/pageAttach"));
        assert_eq!(schemes.len(), 10);
    }

    #[test]
    fn unregistered_scheme_is_unsupported() {
        let context = ResolutionContext::with_defaults(ModelDefaults::default());
        let oracle = DocumentSet::default();
        let env = Environment::new(&context, &oracle);
        let reference = ResourceReference::typed(ResourceType::URL, "https://example.org");
        assert!(default_registry().resolve(&reference, EntityType::Document, &env).unwrap().is_none());
    }

    #[test]
    fn relative_dispatch_leaves_unanchored_references_relative() {
        let context = ResolutionContext::with_defaults(ModelDefaults::default());
        let oracle = DocumentSet::default();
        let env = Environment::new(&context, &oracle);
        let reference = ResourceReference::untyped(ResourceType::DOCUMENT, "Space.Page");
        let resolved = default_registry()
            .resolve_relative(&reference, EntityType::Document, &env)
            .unwrap()
            .unwrap();
        assert!(!resolved.is_absolute());
        assert_eq!(resolved.to_string(), "Space.Page");
    }

    #[test]
    fn link_text_is_typed_only_for_known_schemes() {
        let registry = default_registry();
        let typed = registry.parse_link("attach:Page@f.png", &ResourceType::DOCUMENT);
        assert!(typed.typed);
        assert_eq!(typed.resource_type, ResourceType::ATTACHMENT);
        assert_eq!(typed.reference, "Page@f.png");

        let wiki = registry.parse_link("dev:Space.Page", &ResourceType::DOCUMENT);
        assert!(!wiki.typed);
        assert_eq!(wiki.reference, "dev:Space.Page");

        let external = registry.parse_link("https://example.org", &ResourceType::DOCUMENT);
        assert!(external.typed);
        assert_eq!(external.resource_type.as_str(), "https");
    }

    #[test]
    fn custom_resolver_can_be_registered() {
        let mut registry = ResolverRegistry::default();
        assert!(!registry.is_registered("doc"));
        registry.register("doc", Box::new(DocumentResolver::absolute()));
        assert!(registry.get(&ResourceType::DOCUMENT).is_some());
    }
}
