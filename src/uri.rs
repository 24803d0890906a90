//! URI helpers: scheme normalization, base resolution and display names.
//!
//! Resolution delegates to the [`url`] crate. Templated hrefs need extra care
//! because `{` and `}` would be percent-encoded by a plain join, so
//! [`resolve_template`] swaps each expression for an inert placeholder,
//! resolves, then restores the expressions.

use url::Url;

use crate::constants::GENERIC_DOMAINS;
use crate::core::{NavigatorError, Result};
use crate::template::EXPRESSION_PATTERN;

const SCHEME_DELIMITER: &str = "://";

/// Normalize the scheme of a user supplied URL.
///
/// - no scheme: `http://` is prepended
/// - `http` or `https`, in any case: returned with the scheme lower-cased
/// - any other scheme: [`NavigatorError::BadScheme`]
/// - more than one `://`: [`NavigatorError::AmbiguousScheme`]
///
/// # Examples
///
/// ```
/// use hal_navigator::uri::fix_scheme;
///
/// assert_eq!(fix_scheme("example.com/x").unwrap(), "http://example.com/x");
/// assert!(fix_scheme("ftp://x").is_err());
/// assert!(fix_scheme("http://a://b").is_err());
/// ```
pub fn fix_scheme(url: &str) -> Result<String> {
    let parts: Vec<&str> = url.split(SCHEME_DELIMITER).collect();
    match parts.as_slice() {
        [_] => Ok(format!("http{SCHEME_DELIMITER}{url}")),
        [scheme, rest] if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") => {
            Ok(format!("{}{SCHEME_DELIMITER}{rest}", scheme.to_ascii_lowercase()))
        }
        [scheme, _] => Err(NavigatorError::BadScheme {
            url: url.to_string(),
            scheme: (*scheme).to_string(),
        }),
        _ => Err(NavigatorError::AmbiguousScheme {
            url: url.to_string(),
        }),
    }
}

/// Resolve `href` against `base` following RFC 3986 reference resolution.
pub fn resolve(base: &str, href: &str) -> Result<String> {
    let base_url = parse(base)?;
    let joined = base_url.join(href).map_err(|e| NavigatorError::InvalidUri {
        uri: href.to_string(),
        reason: e.to_string(),
    })?;
    Ok(joined.to_string())
}

/// Resolve a URI template against `base` without mangling its expressions.
pub fn resolve_template(base: &str, template: &str) -> Result<String> {
    let mut expressions = Vec::new();
    let masked = EXPRESSION_PATTERN.replace_all(template, |caps: &regex::Captures<'_>| {
        expressions.push(caps[0].to_string());
        placeholder(expressions.len() - 1)
    });

    let mut resolved = resolve(base, &masked)?;
    for (index, expression) in expressions.iter().enumerate() {
        resolved = resolved.replacen(&placeholder(index), expression, 1);
    }
    Ok(resolved)
}

fn placeholder(index: usize) -> String {
    format!("__halnav_expr_{index}__")
}

fn parse(uri: &str) -> Result<Url> {
    Url::parse(uri).map_err(|e| NavigatorError::InvalidUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })
}

/// Derive a short API name from the host of `root`.
///
/// The top-level domain and generic hosting labels (`localhost`, `herokuapp`,
/// ...) are dropped and the remaining labels are title-cased and joined:
/// `http://haltalk.herokuapp.com/` becomes `Haltalk`.
pub fn namify(root: &str) -> String {
    let host = fix_scheme(root)
        .ok()
        .and_then(|fixed| Url::parse(&fixed).ok())
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| root.to_string());

    let mut labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() > 1 && !labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit())) {
        labels.pop();
    }

    let name: String = labels
        .iter()
        .filter(|label| !GENERIC_DOMAINS.contains(label))
        .map(|label| title_case(label))
        .collect();

    if name.is_empty() {
        title_case(&host)
    } else {
        name
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Replace the API root prefix of `uri` with `/`.
pub fn relative_to(root: &str, uri: &str) -> String {
    match uri.strip_prefix(root) {
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        Some(rest) => format!("/{rest}"),
        None => uri.to_string(),
    }
}

/// Render a relative URI as an attribute path: `/users/3/` becomes `.users[3]`.
pub fn display_path(relative: &str) -> String {
    relative
        .split('/')
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            if chunk.chars().all(|c| c.is_ascii_digit()) {
                format!("[{chunk}]")
            } else {
                format!(".{chunk}")
            }
        })
        .collect()
}
