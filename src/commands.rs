//! CLI commands for wikiref: resolve, check.

use std::path::PathBuf;
use std::process::ExitCode;

use wikiref::config::Config;
use wikiref::convert;
use wikiref::oracle;
use wikiref::scanner::{self, LinkKind, Page};
use wikiref::{
    ContentDirectory, EntityReference, EntityType, Environment, Error, ExistenceOracle, ResolutionContext,
    ResourceReference, ResourceType, default_registry,
};

/// A resolved link from a content page.
#[derive(serde::Serialize)]
struct CheckedLink {
    /// Whether the resolved document exists.
    exists: bool,
    /// Link or image.
    kind: LinkKind,
    /// 1-based line in the page.
    line: u32,
    /// Content file holding the link.
    page: String,
    /// Resolved reference, absent for unsupported schemes.
    resolved: Option<String>,
    /// Target as written.
    target: String,
}

/// Everything `resolve` needs from the command line.
pub struct ResolveOptions {
    /// Base references, outermost first.
    pub bases: Vec<String>,
    /// Current document; defaults to the default home page.
    pub current: Option<String>,
    /// Emit JSON instead of the bare reference.
    pub json: bool,
    /// Raw reference text.
    pub reference: String,
    /// Dispatch to the relative family.
    pub relative: bool,
    /// Declared resource type (scheme).
    pub resource_type: String,
    /// Kind of the printed result.
    pub target: EntityType,
    /// Whether the type was written explicitly.
    pub typed: bool,
}

/// Result of `resolve`, as printed with `--json`.
#[derive(serde::Serialize)]
struct ResolveReport<'a> {
    /// Whether the result is wiki-rooted.
    absolute: Option<bool>,
    /// Base references as given.
    bases: &'a [String],
    /// Current document the reference was resolved in.
    current: String,
    /// Whether the owning document exists in the content directory.
    exists: Option<bool>,
    /// Raw reference text.
    reference: &'a str,
    /// Resolved reference, absent when unsupported.
    resolved: Option<String>,
    /// Declared resource type.
    #[serde(rename = "type")]
    resource_type: ResourceType,
    /// Kind of the resolved reference.
    target: EntityType,
    /// Whether the type was written explicitly.
    typed: bool,
}

/// Resolve every link in the content directory and report the ones whose
/// target document does not exist.
///
/// # Errors
///
/// Returns errors from config loading, scanning or resolution.
pub fn check(json: bool) -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let content = config.content_directory(&root);
    let pages = scanner::scan(&content, &config)?;

    let mut checked: Vec<CheckedLink> = Vec::new();
    let mut total = 0_usize;
    for page in &pages {
        total = total.saturating_add(page.links.len());
        check_page(page, &config, &content, &mut checked)?;
    }

    let broken: Vec<&CheckedLink> = checked.iter().filter(|c| return !c.exists).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&broken)?);
    } else {
        for link in &broken {
            let resolved = link.resolved.as_deref().unwrap_or("unsupported");
            println!("BROKEN  {}:{}  {} -> {resolved}", link.page, link.line, link.target);
        }
    }

    let broken_count = broken.len();
    if broken_count > 0 {
        eprintln!();
        eprintln!("{broken_count} broken of {total} links in {} pages", pages.len());
        return Ok(ExitCode::from(1));
    }
    eprintln!("All {total} links in {} pages resolve", pages.len());
    return Ok(ExitCode::SUCCESS);
}

/// Resolve the links of one page against that page.
/// Links with an external scheme are skipped.
///
/// # Errors
///
/// Returns resolution errors.
fn check_page(
    page: &Page,
    config: &Config,
    content: &ContentDirectory,
    checked: &mut Vec<CheckedLink>,
) -> Result<(), Error> {
    let registry = default_registry();
    let context = ResolutionContext::new(&page.document, config.defaults.clone());
    let env = Environment::new(&context, content);
    let path = scanner::display_path(content, page);

    for link in &page.links {
        let reference = registry.parse_link(&link.target, &link.kind.default_type());
        if !registry.is_registered(reference.resource_type.as_str()) {
            continue;
        }
        let resolved = registry.resolve(&reference, reference_kind(&reference), &env)?;
        let exists = resolved
            .as_ref()
            .and_then(|r| return convert::convert(r, EntityType::Document, context.defaults()))
            .is_some_and(|document| return oracle::document_exists(content, &document));
        checked.push(CheckedLink {
            exists,
            kind: link.kind,
            line: link.line,
            page: path.clone(),
            resolved: resolved.map(|r| return r.to_string()),
            target: link.target.clone(),
        });
    }
    return Ok(());
}

/// Native entity kind of a reference's resource type.
fn reference_kind(reference: &ResourceReference) -> EntityType {
    return reference
        .resource_type
        .absolute()
        .as_str()
        .parse()
        .unwrap_or(EntityType::Document);
}

/// Resolve one reference and print it.
///
/// # Errors
///
/// Returns errors from config loading or resolution.
pub fn resolve(options: &ResolveOptions) -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let content = config.content_directory(&root);
    let context = match &options.current {
        Some(current) => ResolutionContext::parse(current, config.defaults.clone()),
        None => ResolutionContext::with_defaults(config.defaults.clone()),
    };

    let resource_type = ResourceType::new(options.resource_type.clone());
    let reference = ResourceReference {
        base_references: options.bases.clone(),
        reference: options.reference.clone(),
        resource_type: resource_type.clone(),
        typed: options.typed,
    };
    let env = Environment::new(&context, &content);
    let registry = default_registry();
    let resolved = if options.relative {
        registry.resolve_relative(&reference, options.target, &env)?
    } else {
        registry.resolve(&reference, options.target, &env)?
    };

    if options.json {
        let report = ResolveReport {
            absolute: resolved.as_ref().map(EntityReference::is_absolute),
            bases: &options.bases,
            current: context.current().to_string(),
            exists: owning_document_exists(resolved.as_ref(), &context, &content),
            reference: &options.reference,
            resolved: resolved.as_ref().map(ToString::to_string),
            resource_type,
            target: options.target,
            typed: options.typed,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(resolved) = &resolved {
        println!("{resolved}");
    }

    if resolved.is_none() {
        eprintln!("unsupported: no `{}` reference for `{}`", options.target, options.reference);
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Whether the document owning `resolved` exists. `None` for relative results.
fn owning_document_exists(
    resolved: Option<&EntityReference>,
    context: &ResolutionContext,
    oracle: &dyn ExistenceOracle,
) -> Option<bool> {
    let resolved = resolved.filter(|r| return r.is_absolute())?;
    let document = convert::convert(resolved, EntityType::Document, context.defaults())?;
    return Some(oracle::document_exists(oracle, &document));
}
