use wikiref::Error;
use wikiref::config::CONFIG_FILE;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
    return;
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ContentRootNotFound { path } => render_content_root_not_found(&path.display().to_string()),
        Error::InvalidEntityType { name } => render_invalid_entity_type(name),
        Error::KindMismatch { actual, expected } => format!("\
# Error: Resource Type Mismatch

A `{actual}` reference was given to the `{expected}` resolver.
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Correct the syntax in `{CONFIG_FILE}`.
"),
        _ => render_generic(e),
    };
}

fn render_content_root_not_found(path: &str) -> String {
    return format!("\
# Error: Content Root Not Found

`{path}` is not a directory.

## Fix

Point `[content] root` in `{CONFIG_FILE}` at the directory holding one
subdirectory per wiki:

    [content]
    root = \"path/to/content\"
");
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON Output

{e}
"),
        Error::OracleFailed { reason, reference } => format!("\
# Error: Existence Check Failed

Could not check whether `{reference}` exists: {reason}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_invalid_entity_type(name: &str) -> String {
    return format!("\
# Error: Invalid Entity Type

`{name}` is not an entity type.

## Valid types

- `wiki`
- `space`
- `document` (`doc`)
- `attachment` (`attach`)
- `page`
- `page_attachment` (`pageAttach`)
");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use wikiref::ResourceType;

    #[test]
    fn content_root_diagnostic_names_the_path_and_config() {
        let md = render_error(&Error::ContentRootNotFound {
            path: PathBuf::from("missing/content"),
        });
        assert!(md.starts_with("# Error: Content Root Not Found"));
        assert!(md.contains("`missing/content`"));
        assert!(md.contains(CONFIG_FILE));
    }

    #[test]
    fn kind_mismatch_names_both_types() {
        let md = render_error(&Error::KindMismatch {
            actual: ResourceType::SPACE,
            expected: ResourceType::DOCUMENT,
        });
        assert!(md.contains("`space`"));
        assert!(md.contains("`doc`"));
    }

    #[test]
    fn invalid_entity_type_lists_valid_names() {
        let md = render_error(&Error::InvalidEntityType { name: "object".to_string() });
        assert!(md.contains("`object`"));
        assert!(md.contains("`pageAttach`"));
    }
}
