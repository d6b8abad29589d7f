use crate::options::Resolution;
use regex::Regex;
use std::sync::OnceLock;

/// A `@mixin <name> from <location>` directive after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub mixin_name: String,
    /// Location handed to the loader, default suffix included.
    pub location: String,
    /// Source of the consuming stylesheet. Only set when the loader is
    /// responsible for interpreting relative locations.
    pub base: Option<String>,
}

fn directive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^(.+?)\s+from\s+("[^"]*"|'[^']*'|[A-Za-z0-9_-]+)$"#)
            .expect("directive pattern is valid")
    })
}

/// Split directive params into the mixin name and the raw location token.
/// Returns `None` for plain same-document references (`@mixin foo;`).
pub fn parse_directive(params: &str) -> Option<(&str, &str)> {
    let caps = directive_pattern().captures(params)?;
    let name = caps.get(1)?.as_str();
    let location = caps.get(2)?.as_str();
    Some((name, remove_wrapping_quotes(location)))
}

/// Drop one leading and one trailing quote character, if present.
pub fn remove_wrapping_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

/// Everything up to and including the last `/`; empty when there is none.
pub fn directory_of(path: &str) -> &str {
    let end = path.rfind('/').map_or(0, |i| i + 1);
    &path[..end]
}

/// Resolve `relative` against `base_dir` with a segment stack.
///
/// Locations starting with `/` are returned unchanged. A `..` that would
/// climb above an absolute root is ignored; against a relative (or empty)
/// base, unmatched `..` segments are kept at the front.
pub fn absolute_path(base_dir: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        return relative.to_string();
    }

    let mut stack: Vec<&str> = base_dir.split('/').collect();
    // Trailing file name, or the empty segment after the final `/`.
    stack.pop();

    for part in relative.split('/') {
        match part {
            "." => {}
            ".." => match stack.last() {
                Some(&"") if stack.len() == 1 => {
                    tracing::warn!(base_dir, relative, "'..' clamped at the root");
                }
                None | Some(&"..") => stack.push(".."),
                Some(_) => {
                    stack.pop();
                }
            },
            _ => stack.push(part),
        }
    }

    stack.join("/")
}

/// Append `suffix` unless the location already mentions it anywhere.
pub fn with_default_suffix(location: &str, suffix: &str) -> String {
    if location.contains(suffix) {
        location.to_string()
    } else {
        format!("{}{}", location, suffix)
    }
}

/// Turn directive params into a [`Reference`], or `None` when the params
/// carry no `from` clause.
pub fn resolve(
    params: &str,
    source: Option<&str>,
    default_suffix: &str,
    resolution: Resolution,
) -> Option<Reference> {
    let (name, raw_location) = parse_directive(params)?;
    let (location, base) = match resolution {
        Resolution::PathStack => {
            let base_dir = directory_of(source.unwrap_or(""));
            (absolute_path(base_dir, raw_location), None)
        }
        Resolution::LoaderRelative => (raw_location.to_string(), source.map(str::to_string)),
    };
    Some(Reference {
        mixin_name: name.to_string(),
        location: with_default_suffix(&location, default_suffix),
        base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directive_forms() {
        assert_eq!(
            parse_directive("foo from './bar.css'"),
            Some(("foo", "./bar.css"))
        );
        assert_eq!(
            parse_directive("foo from \"../bar\""),
            Some(("foo", "../bar"))
        );
        assert_eq!(parse_directive("foo from bar-baz_1"), Some(("foo", "bar-baz_1")));
        assert_eq!(parse_directive("foo   from   bar"), Some(("foo", "bar")));
    }

    #[test]
    fn test_parse_directive_rejects_other_shapes() {
        assert_eq!(parse_directive("foo"), None);
        assert_eq!(parse_directive("foo(1px, red)"), None);
        // Bare locations may not contain path separators.
        assert_eq!(parse_directive("foo from ./bar"), None);
        assert_eq!(parse_directive("foo from 'bar' extra"), None);
        assert_eq!(parse_directive("from bar"), None);
    }

    #[test]
    fn test_empty_quoted_location() {
        assert_eq!(parse_directive("foo from ''"), Some(("foo", "")));
    }

    #[test]
    fn test_remove_wrapping_quotes() {
        assert_eq!(remove_wrapping_quotes("'a'"), "a");
        assert_eq!(remove_wrapping_quotes("\"a\""), "a");
        assert_eq!(remove_wrapping_quotes("a"), "a");
        assert_eq!(remove_wrapping_quotes("''"), "");
    }

    #[test]
    fn test_directory_of() {
        assert_eq!(directory_of("/a/b/c.css"), "/a/b/");
        assert_eq!(directory_of("c.css"), "");
        assert_eq!(directory_of("/"), "/");
        assert_eq!(directory_of(""), "");
    }

    #[test]
    fn test_loader_relative_keeps_raw_location() {
        let reference = resolve(
            "foo from '../d'",
            Some("/a/b/c.css"),
            ".trait",
            Resolution::LoaderRelative,
        )
        .unwrap();
        assert_eq!(reference.mixin_name, "foo");
        assert_eq!(reference.location, "../d.trait");
        assert_eq!(reference.base.as_deref(), Some("/a/b/c.css"));
    }

    #[test]
    fn test_path_stack_has_no_base() {
        let reference =
            resolve("foo from '../d'", Some("/a/b/c.css"), ".css", Resolution::PathStack).unwrap();
        assert_eq!(reference.location, "/a/d.css");
        assert_eq!(reference.base, None);
    }

    #[test]
    fn test_plain_reference_is_not_resolved() {
        assert_eq!(
            resolve("foo", Some("/a/b/c.css"), ".css", Resolution::PathStack),
            None
        );
    }
}
