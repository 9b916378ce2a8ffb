//! Resolution context: the current document and the platform's default names.

use crate::parser;
use crate::resolver;
use crate::types::{EntityReference, EntityType};

/// Default names used wherever a reference and its base leave a level unspecified.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ModelDefaults {
    /// Attachment name used when converting to an attachment reference.
    pub attachment: String,
    /// Space home page name (`WebHome`).
    pub document: String,
    /// Space used when nothing else provides one.
    pub space: String,
    /// Wiki used when nothing else provides one.
    pub wiki: String,
}

/// Per-call context: the document being rendered plus the defaults.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// Absolute reference of the current document.
    current: EntityReference,
    /// Default names.
    defaults: ModelDefaults,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        return Self {
            attachment: "filename".to_string(),
            document: "WebHome".to_string(),
            space: "Main".to_string(),
            wiki: "xwiki".to_string(),
        };
    }
}

impl ModelDefaults {
    /// Home page of the default space of the default wiki.
    pub fn home_page(&self) -> EntityReference {
        let home = EntityReference::new(EntityType::Document, self.document.as_str());
        return resolver::resolve_current(&home, EntityType::Document, None, self);
    }
}

impl ResolutionContext {
    /// The current document reference, used as the default base.
    pub const fn current(&self) -> &EntityReference {
        return &self.current;
    }

    /// Default names for this context.
    pub const fn defaults(&self) -> &ModelDefaults {
        return &self.defaults;
    }

    /// Context whose current document is `current`. A partial reference is
    /// completed from the defaults so the context is always absolute.
    pub fn new(current: &EntityReference, defaults: ModelDefaults) -> Self {
        let current = resolver::resolve_current(current, EntityType::Document, None, &defaults);
        return Self { current, defaults };
    }

    /// Context whose current document is given as a reference string.
    pub fn parse(current: &str, defaults: ModelDefaults) -> Self {
        return Self::new(&parser::parse(current, EntityType::Document), defaults);
    }

    /// Context positioned on the default home page.
    pub fn with_defaults(defaults: ModelDefaults) -> Self {
        let current = defaults.home_page();
        return Self { current, defaults };
    }
}
